//! The form record and its field vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SubsError};

/// Target AI platform(s) for generated prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Claude,
    Gemini,
    Both,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Claude => "claude",
            Platform::Gemini => "gemini",
            Platform::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "claude" => Some(Platform::Claude),
            "gemini" => Some(Platform::Gemini),
            "both" => Some(Platform::Both),
            _ => None,
        }
    }
}

/// Which side of the application the practitioner acts for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Applicant,
    Respondent,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Applicant => "applicant",
            Position::Respondent => "respondent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "applicant" => Some(Position::Applicant),
            "respondent" => Some(Position::Respondent),
            _ => None,
        }
    }
}

/// Every writable field of the form, by its wire name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Platform,
    Position,
    Chronology,
    Arguments,
    TemplateText,
    Instructions,
    OpposingSubmissions,
    PlaintiffPleadings,
    DefendantPleadings,
    SummonsApplication,
    IncludeChecklist,
}

impl FieldName {
    pub const ALL: [FieldName; 11] = [
        FieldName::Platform,
        FieldName::Position,
        FieldName::Chronology,
        FieldName::Arguments,
        FieldName::TemplateText,
        FieldName::Instructions,
        FieldName::OpposingSubmissions,
        FieldName::PlaintiffPleadings,
        FieldName::DefendantPleadings,
        FieldName::SummonsApplication,
        FieldName::IncludeChecklist,
    ];

    /// Free-form text fields, in form order
    pub const TEXT: [FieldName; 8] = [
        FieldName::Chronology,
        FieldName::Arguments,
        FieldName::TemplateText,
        FieldName::Instructions,
        FieldName::OpposingSubmissions,
        FieldName::PlaintiffPleadings,
        FieldName::DefendantPleadings,
        FieldName::SummonsApplication,
    ];

    /// Fields that gate generation
    pub const REQUIRED: [FieldName; 3] = [
        FieldName::Chronology,
        FieldName::Arguments,
        FieldName::TemplateText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Platform => "platform",
            FieldName::Position => "position",
            FieldName::Chronology => "chronology",
            FieldName::Arguments => "arguments",
            FieldName::TemplateText => "templateText",
            FieldName::Instructions => "instructions",
            FieldName::OpposingSubmissions => "opposingSubmissions",
            FieldName::PlaintiffPleadings => "plaintiffPleadings",
            FieldName::DefendantPleadings => "defendantPleadings",
            FieldName::SummonsApplication => "summonsApplication",
            FieldName::IncludeChecklist => "includeChecklist",
        }
    }

    /// Human-readable label used in warnings
    pub fn label(&self) -> &'static str {
        match self {
            FieldName::Platform => "Platform",
            FieldName::Position => "Position",
            FieldName::Chronology => "Chronology",
            FieldName::Arguments => "Arguments",
            FieldName::TemplateText => "Template text",
            FieldName::Instructions => "Instructions",
            FieldName::OpposingSubmissions => "Opposing submissions",
            FieldName::PlaintiffPleadings => "Plaintiff pleadings",
            FieldName::DefendantPleadings => "Defendant pleadings",
            FieldName::SummonsApplication => "Summons / application",
            FieldName::IncludeChecklist => "Include checklist",
        }
    }

    pub fn is_text(&self) -> bool {
        Self::TEXT.contains(self)
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = SubsError;

    fn from_str(s: &str) -> Result<Self> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| SubsError::InvalidField(s.to_string()))
    }
}

/// All user-entered and selected values of the form
///
/// Text fields are never absent: an unset field is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub platform: Platform,
    pub position: Position,
    pub chronology: String,
    pub arguments: String,
    pub template_text: String,
    pub instructions: String,
    pub opposing_submissions: String,
    pub plaintiff_pleadings: String,
    pub defendant_pleadings: String,
    pub summons_application: String,
    pub include_checklist: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            position: Position::default(),
            chronology: String::new(),
            arguments: String::new(),
            template_text: String::new(),
            instructions: String::new(),
            opposing_submissions: String::new(),
            plaintiff_pleadings: String::new(),
            defendant_pleadings: String::new(),
            summons_application: String::new(),
            include_checklist: true,
        }
    }
}

impl FormState {
    /// Borrow a text field; `None` for the enum and flag fields
    pub fn text(&self, field: FieldName) -> Option<&str> {
        let value = match field {
            FieldName::Chronology => &self.chronology,
            FieldName::Arguments => &self.arguments,
            FieldName::TemplateText => &self.template_text,
            FieldName::Instructions => &self.instructions,
            FieldName::OpposingSubmissions => &self.opposing_submissions,
            FieldName::PlaintiffPleadings => &self.plaintiff_pleadings,
            FieldName::DefendantPleadings => &self.defendant_pleadings,
            FieldName::SummonsApplication => &self.summons_application,
            FieldName::Platform | FieldName::Position | FieldName::IncludeChecklist => {
                return None
            }
        };
        Some(value.as_str())
    }

    fn text_mut(&mut self, field: FieldName) -> Option<&mut String> {
        let value = match field {
            FieldName::Chronology => &mut self.chronology,
            FieldName::Arguments => &mut self.arguments,
            FieldName::TemplateText => &mut self.template_text,
            FieldName::Instructions => &mut self.instructions,
            FieldName::OpposingSubmissions => &mut self.opposing_submissions,
            FieldName::PlaintiffPleadings => &mut self.plaintiff_pleadings,
            FieldName::DefendantPleadings => &mut self.defendant_pleadings,
            FieldName::SummonsApplication => &mut self.summons_application,
            FieldName::Platform | FieldName::Position | FieldName::IncludeChecklist => {
                return None
            }
        };
        Some(value)
    }

    /// True when a text field has something other than whitespace
    pub fn is_filled(&self, field: FieldName) -> bool {
        self.text(field)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    }

    /// Write a field from its textual form
    ///
    /// Text is stored verbatim. Enum fields take their lowercase wire value
    /// and the checklist flag takes `true`/`false`. On error nothing changes.
    pub fn set(&mut self, field: FieldName, value: &str) -> Result<()> {
        let invalid = || SubsError::InvalidFieldValue {
            field: field.as_str().to_string(),
            value: value.to_string(),
        };

        match field {
            FieldName::Platform => {
                self.platform = Platform::parse(value).ok_or_else(invalid)?;
            }
            FieldName::Position => {
                self.position = Position::parse(value).ok_or_else(invalid)?;
            }
            FieldName::IncludeChecklist => {
                self.include_checklist = match value {
                    "true" => true,
                    "false" => false,
                    _ => return Err(invalid()),
                };
            }
            text_field => {
                if let Some(slot) = self.text_mut(text_field) {
                    slot.clear();
                    slot.push_str(value);
                }
            }
        }
        Ok(())
    }

    /// Current value of any field in its textual form
    pub fn value_string(&self, field: FieldName) -> String {
        match field {
            FieldName::Platform => self.platform.as_str().to_string(),
            FieldName::Position => self.position.as_str().to_string(),
            FieldName::IncludeChecklist => self.include_checklist.to_string(),
            text_field => self.text(text_field).unwrap_or_default().to_string(),
        }
    }
}
