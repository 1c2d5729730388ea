use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format_bytes;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubsError {
    #[error("Unknown field: {0}")]
    InvalidField(String),

    #[error("Invalid value {value:?} for field {field}")]
    InvalidFieldValue { field: String, value: String },

    #[error("Unsupported file type: {name} ({mime_type})")]
    UnsupportedFileType { name: String, mime_type: String },

    #[error("File too large: {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: u64, max: u64 },

    #[error("File is empty: {0}")]
    EmptyFile(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SubsError>;

/// Coarse error category reported across the wasm boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidField,
    UnsupportedFileType,
    FileTooLarge,
    EmptyFile,
    Extraction,
    InvalidSession,
    NotFound,
    Storage,
    InvalidConfig,
}

impl SubsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubsError::InvalidField(_) | SubsError::InvalidFieldValue { .. } => {
                ErrorKind::InvalidField
            }
            SubsError::UnsupportedFileType { .. } => ErrorKind::UnsupportedFileType,
            SubsError::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            SubsError::EmptyFile(_) => ErrorKind::EmptyFile,
            SubsError::Extraction(_) => ErrorKind::Extraction,
            SubsError::InvalidSession(_) => ErrorKind::InvalidSession,
            SubsError::NotFound(_) => ErrorKind::NotFound,
            SubsError::Storage(_) => ErrorKind::Storage,
            SubsError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// One-line message for the status area of the page
    pub fn status_message(&self) -> String {
        match self {
            SubsError::InvalidField(name) => format!("Unknown field: {}", name),
            SubsError::InvalidFieldValue { field, value } => {
                format!("Invalid value '{}' for {}", value, field)
            }
            SubsError::UnsupportedFileType { name, .. } => format!(
                "Unsupported file type: {}. Please upload a .txt, .pdf or .docx file.",
                name
            ),
            SubsError::FileTooLarge { size, max } => format!(
                "File too large ({}). Maximum size is {}.",
                format_bytes(*size),
                format_bytes(*max)
            ),
            SubsError::EmptyFile(name) => format!("File is empty: {}", name),
            SubsError::Extraction(detail) => format!("Error processing document: {}", detail),
            SubsError::InvalidSession(detail) => format!("Invalid session file: {}", detail),
            SubsError::NotFound(_) => "No saved session found".to_string(),
            SubsError::Storage(detail) => format!("Error accessing local storage: {}", detail),
            SubsError::InvalidConfig(detail) => format!("Invalid configuration: {}", detail),
        }
    }
}

impl From<serde_json::Error> for SubsError {
    fn from(e: serde_json::Error) -> Self {
        SubsError::InvalidSession(e.to_string())
    }
}
