//! File type allow-list

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubsError};

const MIME_TEXT: &str = "text/plain";
const MIME_PDF: &str = "application/pdf";
const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Formats the ingestor can turn into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Word,
}

impl DocumentFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "txt" => Some(DocumentFormat::PlainText),
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Word),
            _ => None,
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            MIME_TEXT => Some(DocumentFormat::PlainText),
            MIME_PDF => Some(DocumentFormat::Pdf),
            MIME_DOCX => Some(DocumentFormat::Word),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => MIME_TEXT,
            DocumentFormat::Pdf => MIME_PDF,
            DocumentFormat::Word => MIME_DOCX,
        }
    }
}

/// Lowercased extension of the final path segment, if it has one
pub fn extension_of(name: &str) -> Option<String> {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Decide the format of an upload or reject it
///
/// When both the extension and the MIME type are recognised they must agree.
/// A blank or generic MIME type defers to the extension; a name without an
/// extension defers to the MIME type.
pub fn classify(name: &str, mime_type: &str) -> Result<DocumentFormat> {
    let mime = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let generic_mime = mime.is_empty() || mime == "application/octet-stream";

    let unsupported = || {
        tracing::warn!(file = %name, mime = %mime_type, "rejected upload type");
        SubsError::UnsupportedFileType {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
        }
    };

    match (extension_of(name), generic_mime) {
        (Some(ext), true) => DocumentFormat::from_extension(&ext).ok_or_else(unsupported),
        (Some(ext), false) => {
            match (
                DocumentFormat::from_extension(&ext),
                DocumentFormat::from_mime(&mime),
            ) {
                (Some(by_ext), Some(by_mime)) if by_ext == by_mime => Ok(by_ext),
                _ => Err(unsupported()),
            }
        }
        (None, false) => DocumentFormat::from_mime(&mime).ok_or_else(unsupported),
        (None, true) => Err(unsupported()),
    }
}
