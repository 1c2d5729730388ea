//! Tunable constants for ingestion, validation, sessions and logging
//!
//! Every section has defaults, so an empty JSON object is a valid
//! configuration. The page may pass overrides when it creates the app.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, SubsError};
use crate::state::FieldName;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsConfig {
    pub ingest: IngestConfig,
    pub validation: ValidationConfig,
    pub session: SessionConfig,
    pub log: LogConfig,
}

impl SubsConfig {
    /// Parse and validate configuration from a JSON string
    pub fn from_json(s: &str) -> Result<Self> {
        let config: SubsConfig = serde_json::from_str(s)
            .map_err(|e| SubsError::InvalidConfig(format!("Failed to parse JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ingest.max_file_size_bytes == 0 {
            return Err(SubsError::InvalidConfig(
                "ingest.max_file_size_bytes must be greater than zero".to_string(),
            ));
        }
        if self.ingest.max_expanded_bytes == 0 {
            return Err(SubsError::InvalidConfig(
                "ingest.max_expanded_bytes must be greater than zero".to_string(),
            ));
        }
        if self.validation.weights.total() == 0 {
            return Err(SubsError::InvalidConfig(
                "validation.weights must not all be zero".to_string(),
            ));
        }
        if self.session.storage_key.trim().is_empty() {
            return Err(SubsError::InvalidConfig(
                "session.storage_key must not be empty".to_string(),
            ));
        }
        self.log.level()?;
        Ok(())
    }
}

/// Document ingestion limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Upload ceiling in bytes (default: 25 MiB)
    pub max_file_size_bytes: u64,
    /// Inserted between the text of consecutive PDF pages
    pub page_separator: String,
    /// Ceiling on a decompressed archive part such as `word/document.xml`
    /// (default: 100 MiB)
    pub max_expanded_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 25 * 1024 * 1024,
            page_separator: "\n\n--- Page Break ---\n\n".to_string(),
            max_expanded_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Progress weighting and advisory thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub weights: CompletionWeights,
    /// Required fields shorter than this (after trimming) get a brevity hint
    pub brief_threshold_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            weights: CompletionWeights::default(),
            brief_threshold_chars: 50,
        }
    }
}

/// Per-field contribution to the completion percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionWeights {
    pub chronology: u32,
    pub arguments: u32,
    pub template_text: u32,
    pub instructions: u32,
    pub opposing_submissions: u32,
    pub plaintiff_pleadings: u32,
    pub defendant_pleadings: u32,
    pub summons_application: u32,
}

impl Default for CompletionWeights {
    fn default() -> Self {
        Self {
            chronology: 25,
            arguments: 25,
            template_text: 25,
            instructions: 5,
            opposing_submissions: 5,
            plaintiff_pleadings: 5,
            defendant_pleadings: 5,
            summons_application: 5,
        }
    }
}

impl CompletionWeights {
    pub fn weight(&self, field: FieldName) -> u32 {
        match field {
            FieldName::Chronology => self.chronology,
            FieldName::Arguments => self.arguments,
            FieldName::TemplateText => self.template_text,
            FieldName::Instructions => self.instructions,
            FieldName::OpposingSubmissions => self.opposing_submissions,
            FieldName::PlaintiffPleadings => self.plaintiff_pleadings,
            FieldName::DefendantPleadings => self.defendant_pleadings,
            FieldName::SummonsApplication => self.summons_application,
            FieldName::Platform | FieldName::Position | FieldName::IncludeChecklist => 0,
        }
    }

    /// Sum of all weights, widened so any set of `u32` weights fits
    pub fn total(&self) -> u64 {
        FieldName::TEXT
            .iter()
            .map(|f| u64::from(self.weight(*f)))
            .sum()
    }
}

/// Local storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub storage_key: String,
    pub app_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: "legalPromptGenerator_session".to_string(),
            app_name: "Submissions Synthesizer".to_string(),
        }
    }
}

/// Console logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level(&self) -> Result<tracing::Level> {
        tracing::Level::from_str(&self.level)
            .map_err(|_| SubsError::InvalidConfig(format!("Unknown log level: {}", self.level)))
    }
}
