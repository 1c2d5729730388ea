//! Format-specific text extraction adapters

pub mod pdf;
pub mod text;
pub mod word;

pub use pdf::PdfExtractor;
pub use text::PlainTextExtractor;
pub use word::WordExtractor;

use super::classify::DocumentFormat;
use crate::config::IngestConfig;
use crate::error::Result;

/// Text pulled out of a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub page_count: Option<u32>,
    pub warnings: Vec<String>,
}

/// Trait for text extraction backends
pub trait TextExtractor {
    /// Backend identifier
    fn name(&self) -> &'static str;

    /// Cheap signature check before a full parse
    fn can_handle(&self, data: &[u8]) -> bool;

    fn extract(&self, data: &[u8]) -> Result<Extracted>;
}

pub fn extractor_for(format: DocumentFormat, config: &IngestConfig) -> Box<dyn TextExtractor> {
    match format {
        DocumentFormat::PlainText => Box::new(PlainTextExtractor),
        DocumentFormat::Pdf => Box::new(PdfExtractor::new(&config.page_separator)),
        DocumentFormat::Word => Box::new(WordExtractor::new(config.max_expanded_bytes)),
    }
}
