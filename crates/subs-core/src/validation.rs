//! Form completeness: gating warnings, brevity hints and progress
//!
//! Validation is a pure function of the form. It keeps no counters between
//! calls, so repeated calls on an unchanged form give identical results.

use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::state::{FieldName, FormState};

/// A message attached to one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub field: FieldName,
    pub message: String,
}

/// Derived completeness of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Missing required fields, in form order. Any entry blocks generation.
    pub warnings: Vec<FieldWarning>,
    /// Non-blocking hints about thin content
    pub advisories: Vec<FieldWarning>,
    /// Weighted share of filled fields, 0-100
    pub completion_percent: u8,
}

impl ValidationResult {
    pub fn can_generate(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn progress_label(&self) -> String {
        format!("Form completion: {}%", self.completion_percent)
    }

    pub fn has_warning_for(&self, field: FieldName) -> bool {
        self.warnings.iter().any(|w| w.field == field)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, state: &FormState) -> ValidationResult {
        let mut warnings = Vec::new();
        let mut advisories = Vec::new();

        for field in FieldName::REQUIRED {
            let trimmed = state.text(field).unwrap_or_default().trim();
            if trimmed.is_empty() {
                warnings.push(FieldWarning {
                    field,
                    message: required_message(field),
                });
            } else if trimmed.chars().count() < self.config.brief_threshold_chars {
                advisories.push(FieldWarning {
                    field,
                    message: brief_message(field),
                });
            }
        }

        ValidationResult {
            warnings,
            advisories,
            completion_percent: self.completion_percent(state),
        }
    }

    fn completion_percent(&self, state: &FormState) -> u8 {
        let weights = &self.config.weights;
        let total = weights.total();
        if total == 0 {
            return 0;
        }

        let filled: u64 = FieldName::TEXT
            .iter()
            .filter(|field| state.is_filled(**field))
            .map(|field| u64::from(weights.weight(*field)))
            .sum();

        (filled * 100 / total).min(100) as u8
    }
}

/// "Arguments" takes a plural verb
fn verb(field: FieldName) -> &'static str {
    match field {
        FieldName::Arguments => "are",
        _ => "is",
    }
}

fn required_message(field: FieldName) -> String {
    format!("{} {} required", field.label(), verb(field))
}

fn brief_message(field: FieldName) -> String {
    let verb = if verb(field) == "are" { "look" } else { "looks" };
    format!("{} {} brief", field.label(), verb)
}

/// Validate with the default weights and thresholds
pub fn validate(state: &FormState) -> ValidationResult {
    Validator::default().validate(state)
}
