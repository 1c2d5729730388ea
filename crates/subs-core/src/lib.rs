//! Form state and submission assembly engine
//!
//! This crate holds everything the Submissions Synthesizer page does that is
//! not presentation: the form record, field writes and their derived
//! counters, validation and progress, document ingestion (plain text, PDF,
//! Word), prompt composition for each target AI platform, and session
//! save/load against a key-value store.
//!
//! ## Architecture
//!
//! - `FormStore` owns the single `FormState` and is the only writer
//! - every write publishes a `FieldChanged` message to subscribed observers
//! - `Ingestor` turns an uploaded file into text; the store commits it
//! - `compose` renders prompts from a borrowed `FormState`
//! - `SessionManager` persists snapshots through any `KeyValueStore`
//!
//! The crate has no browser dependencies; `subs-wasm` binds it to the page.

pub mod compose;
pub mod config;
pub mod error;
pub mod ingest;
pub mod session;
pub mod state;
pub mod sync;
pub mod validation;

pub use compose::{compose, compose_all, ComposedPrompt, PromptTarget};
pub use config::{
    CompletionWeights, IngestConfig, LogConfig, SessionConfig, SubsConfig, ValidationConfig,
};
pub use error::{ErrorKind, Result, SubsError};
pub use ingest::{
    BytesSource, ContentSource, DocumentFormat, IngestFailure, IngestReport, IngestResult,
    IngestedText, Ingestor, UploadedDocument,
};
pub use session::{KeyValueStore, MemoryStore, SessionDocument, SessionManager};
pub use state::{FieldName, FormState, Platform, Position};
pub use sync::{counter_label, FieldChanged, FieldObserver, FormStore, IngestTicket};
pub use validation::{validate, FieldWarning, ValidationResult, Validator};

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(26214400), "25.0 MB");
    }
}
