//! Uploaded document → template text
//!
//! An ingestion runs four steps and stops at the first failure:
//!
//! 1. classify the file by extension and MIME type against the allow-list
//! 2. check the size (declared size before reading, actual size after)
//! 3. extract text with the adapter for the format
//! 4. hand the text back for the store to commit
//!
//! Extracted content is opaque: it is never interpreted, sanitized or
//! executed, only copied into `templateText`.
//!
//! Reading the file is the only suspension point. Two ingestions may be in
//! flight at once; `FormStore::commit_ingest` applies them in completion
//! order, and `FormStore::commit_ingest_if_current` offers a stricter
//! latest-submission-wins mode.

pub mod classify;
pub mod extract;

pub use classify::{classify, DocumentFormat};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::IngestConfig;
use crate::error::{ErrorKind, Result, SubsError};
use extract::{extractor_for, Extracted};

/// Where the bytes of an upload come from
///
/// The page implements this over a browser `File`; tests use `BytesSource`.
#[async_trait(?Send)]
pub trait ContentSource {
    async fn read_bytes(&self) -> Result<Vec<u8>>;
}

/// In-memory content
#[derive(Debug, Clone, Default)]
pub struct BytesSource(pub Vec<u8>);

#[async_trait(?Send)]
impl ContentSource for BytesSource {
    async fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.0.clone())
    }
}

/// A file selected or dropped by the user
#[derive(Debug, Clone)]
pub struct UploadedDocument<S> {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub source: S,
}

impl UploadedDocument<BytesSource> {
    pub fn from_bytes(name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes: bytes.len() as u64,
            source: BytesSource(bytes),
        }
    }
}

/// Text extracted from an accepted upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedText {
    pub file_name: String,
    pub format: DocumentFormat,
    pub text: String,
    pub page_count: Option<u32>,
    /// Observations about the document that were reported but not acted on
    pub warnings: Vec<String>,
}

/// Why an upload was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    pub file_name: String,
    pub error: SubsError,
}

pub type IngestResult = std::result::Result<IngestedText, IngestFailure>;

/// Terminal outcome of an ingestion, shown in the upload status area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub ok: bool,
    pub kind: Option<ErrorKind>,
    pub status: String,
    pub file_name: String,
    pub format: Option<DocumentFormat>,
    pub char_count: usize,
    pub page_count: Option<u32>,
    pub warnings: Vec<String>,
}

impl IngestReport {
    pub fn success(ingested: &IngestedText) -> Self {
        let char_count = ingested.text.chars().count();
        Self {
            ok: true,
            kind: None,
            status: format!(
                "Document loaded successfully: {} ({} characters)",
                ingested.file_name, char_count
            ),
            file_name: ingested.file_name.clone(),
            format: Some(ingested.format),
            char_count,
            page_count: ingested.page_count,
            warnings: ingested.warnings.clone(),
        }
    }

    pub fn failure(file_name: &str, error: &SubsError) -> Self {
        Self {
            ok: false,
            kind: Some(error.kind()),
            status: error.status_message(),
            file_name: file_name.to_string(),
            format: None,
            char_count: 0,
            page_count: None,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Run the whole pipeline for one upload
    pub async fn ingest<S: ContentSource>(&self, upload: UploadedDocument<S>) -> IngestResult {
        let file_name = upload.name.clone();
        self.run(upload).await.map_err(|error| IngestFailure { file_name, error })
    }

    async fn run<S: ContentSource>(&self, upload: UploadedDocument<S>) -> Result<IngestedText> {
        let format = classify(&upload.name, &upload.mime_type)?;
        self.check_size(&upload.name, upload.size_bytes)?;

        let bytes = upload.source.read_bytes().await?;
        // the declared size comes from the browser; trust the bytes
        self.check_size(&upload.name, bytes.len() as u64)?;

        let extractor = extractor_for(format, &self.config);
        tracing::debug!(file = %upload.name, backend = extractor.name(), "extracting text");
        let Extracted {
            text,
            page_count,
            warnings,
        } = extractor.extract(&bytes)?;

        for warning in &warnings {
            tracing::warn!(file = %upload.name, "document warning: {}", warning);
        }

        Ok(IngestedText {
            file_name: upload.name,
            format,
            text,
            page_count,
            warnings,
        })
    }

    fn check_size(&self, name: &str, size: u64) -> Result<()> {
        if size == 0 {
            return Err(SubsError::EmptyFile(name.to_string()));
        }
        if size > self.config.max_file_size_bytes {
            return Err(SubsError::FileTooLarge {
                size,
                max: self.config.max_file_size_bytes,
            });
        }
        Ok(())
    }
}
