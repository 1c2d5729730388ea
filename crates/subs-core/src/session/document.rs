//! Versioned session snapshot and its shape check
//!
//! Loaded documents are checked field by field before anything is built
//! from them. A document either matches the 1.x shape completely or is
//! rejected; there are no partial loads.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SubsError};
use crate::state::{FieldName, FormState, Platform, Position};

pub const SESSION_VERSION: &str = "1.0";

/// Keys a document must carry to be accepted
pub const REQUIRED_KEYS: [FieldName; 4] = [
    FieldName::Platform,
    FieldName::Position,
    FieldName::Chronology,
    FieldName::Arguments,
];

/// A saved copy of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    pub version: String,
    pub app_name: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    #[serde(flatten)]
    pub state: FormState,
}

impl SessionDocument {
    /// Snapshot a form; does not touch storage
    pub fn capture(state: &FormState, app_name: &str, at: DateTime<Utc>) -> Self {
        Self {
            version: SESSION_VERSION.to_string(),
            app_name: app_name.to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            state: state.clone(),
        }
    }

    pub fn to_state(&self) -> FormState {
        self.state.clone()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SubsError::Storage(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SubsError::Storage(e.to_string()))
    }

    /// Parse and shape-check a stored or imported document
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| invalid("expected a JSON object"))?;

        for key in REQUIRED_KEYS {
            if !obj.contains_key(key.as_str()) {
                return Err(invalid(&format!("missing required field '{}'", key)));
            }
        }

        let version = match obj.get("version") {
            None => {
                tracing::info!("migrating unversioned session to {}", SESSION_VERSION);
                SESSION_VERSION.to_string()
            }
            Some(Value::String(v)) => {
                if v.split('.').next() != Some("1") {
                    return Err(invalid(&format!("unsupported version '{}'", v)));
                }
                v.clone()
            }
            Some(_) => return Err(wrong_type("version", "a string")),
        };

        let app_name = optional_string(obj, "appName")?.unwrap_or_default();
        let timestamp = optional_string(obj, "timestamp")?.unwrap_or_default();

        let platform = optional_string(obj, FieldName::Platform.as_str())?
            .ok_or_else(|| wrong_type("platform", "a string"))?;
        let platform = Platform::parse(&platform)
            .ok_or_else(|| invalid(&format!("unknown platform '{}'", platform)))?;

        let position = optional_string(obj, FieldName::Position.as_str())?
            .ok_or_else(|| wrong_type("position", "a string"))?;
        let position = Position::parse(&position)
            .ok_or_else(|| invalid(&format!("unknown position '{}'", position)))?;

        let include_checklist = match obj.get(FieldName::IncludeChecklist.as_str()) {
            None => true,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(wrong_type("includeChecklist", "a boolean")),
        };

        let mut state = FormState {
            platform,
            position,
            include_checklist,
            ..FormState::default()
        };
        for field in FieldName::TEXT {
            if let Some(text) = optional_string(obj, field.as_str())? {
                state.set(field, &text)?;
            }
        }

        Ok(Self {
            version,
            app_name,
            timestamp,
            state,
        })
    }
}

/// A present key must hold a string; an absent key is `None`
fn optional_string(obj: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(wrong_type(key, "a string")),
    }
}

fn invalid(detail: &str) -> SubsError {
    SubsError::InvalidSession(detail.to_string())
}

fn wrong_type(key: &str, expected: &str) -> SubsError {
    invalid(&format!("field '{}' must be {}", key, expected))
}
