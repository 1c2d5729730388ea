//! Prompt composition
//!
//! Renders the form into one prompt per target AI platform. Claude prompts
//! wrap each section in XML-style tags; Gemini prompts use Markdown headings.
//! The applicant and respondent branches differ in voice, goal and which
//! material is put first.
//!
//! Field values are interpolated literally. The output is plain text for
//! another system to read, so nothing is escaped.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::state::{FormState, Platform, Position};

/// A single AI platform a prompt is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptTarget {
    Claude,
    Gemini,
}

impl PromptTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptTarget::Claude => "claude",
            PromptTarget::Gemini => "gemini",
        }
    }

    /// Targets selected by the platform control, in output order
    pub fn for_platform(platform: Platform) -> Vec<PromptTarget> {
        match platform {
            Platform::Claude => vec![PromptTarget::Claude],
            Platform::Gemini => vec![PromptTarget::Gemini],
            Platform::Both => vec![PromptTarget::Claude, PromptTarget::Gemini],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedPrompt {
    pub target: PromptTarget,
    pub text: String,
}

/// Fixed text around the field sections
const OUTPUT_REQUIREMENTS: &str = "\
Write the submissions in formal court style with numbered paragraphs. \
Refer to the chronology by date when relying on a fact. \
Ground each argument in the material provided and do not invent facts, \
authorities or evidence. Where the material is silent, say so.";

const CHECKLIST: [&str; 6] = [
    "Every fact relied on appears in the chronology",
    "Every argument is addressed and supported",
    "The relief sought is stated precisely",
    "The structure follows the template provided",
    "Authorities cited are real and accurately described",
    "Each point made by the other side has been answered",
];

/// Render the prompt for one target
pub fn compose(state: &FormState, target: PromptTarget) -> String {
    let mut out = Writer::new(target, estimate_len(state));

    out.section("Role", "role", role_statement(state.position));
    match state.position {
        Position::Applicant => {
            out.optional(
                "Summons / Application (relief sought)",
                "summons_application",
                &state.summons_application,
            );
        }
        Position::Respondent => {
            if out.optional(
                "Opposing Submissions",
                "opposing_submissions",
                &state.opposing_submissions,
            ) {
                out.paragraph(
                    "Answer the opposing submissions point by point, in the order they are made.",
                );
            }
        }
    }

    out.section("Chronology", "chronology", &state.chronology);
    out.section("Arguments", "arguments", &state.arguments);
    out.optional(
        "Plaintiff Pleadings",
        "plaintiff_pleadings",
        &state.plaintiff_pleadings,
    );
    out.optional(
        "Defendant Pleadings",
        "defendant_pleadings",
        &state.defendant_pleadings,
    );
    if state.position == Position::Respondent {
        out.optional(
            "Summons / Application",
            "summons_application",
            &state.summons_application,
        );
    }
    out.section("Template", "template", &state.template_text);
    out.optional(
        "Additional Instructions",
        "additional_instructions",
        &state.instructions,
    );
    out.section("Output Requirements", "output_requirements", OUTPUT_REQUIREMENTS);

    if state.include_checklist {
        out.checklist(&CHECKLIST);
    }

    tracing::debug!(
        platform = target.as_str(),
        len = out.buf.len(),
        "prompt composed"
    );
    out.finish()
}

/// Render one prompt per target selected by `state.platform`
pub fn compose_all(state: &FormState) -> Vec<ComposedPrompt> {
    PromptTarget::for_platform(state.platform)
        .into_iter()
        .map(|target| ComposedPrompt {
            target,
            text: compose(state, target),
        })
        .collect()
}

fn role_statement(position: Position) -> &'static str {
    match position {
        Position::Applicant => {
            "You are an experienced legal practitioner preparing written submissions \
             on behalf of the applicant. Your goal is to persuade the court to GRANT \
             the relief sought in the summons or application. Lead with the relief \
             sought and show why each element of it is made out."
        }
        Position::Respondent => {
            "You are an experienced legal practitioner preparing written submissions \
             on behalf of the respondent. Your goal is to persuade the court to DENY \
             the relief sought by the applicant. Engage directly with the opposing \
             submissions and show why the application should fail."
        }
    }
}

/// Upper bound on the fixed text plus every field, so the buffer never regrows
fn estimate_len(state: &FormState) -> usize {
    let fields = state.chronology.len()
        + state.arguments.len()
        + state.template_text.len()
        + state.instructions.len()
        + state.opposing_submissions.len()
        + state.plaintiff_pleadings.len()
        + state.defendant_pleadings.len()
        + state.summons_application.len();
    fields + 4096
}

struct Writer {
    target: PromptTarget,
    buf: String,
}

impl Writer {
    fn new(target: PromptTarget, capacity: usize) -> Self {
        let mut buf = String::with_capacity(capacity);
        if target == PromptTarget::Gemini {
            buf.push_str("# Legal Submissions Brief\n\n");
        }
        Self { target, buf }
    }

    fn section(&mut self, title: &str, tag: &str, body: &str) {
        match self.target {
            PromptTarget::Claude => {
                // writing into a String cannot fail
                let _ = write!(self.buf, "<{}>\n{}\n</{}>\n\n", tag, body, tag);
            }
            PromptTarget::Gemini => {
                let _ = write!(self.buf, "## {}\n\n{}\n\n", title, body);
            }
        }
    }

    /// Render only when the field has content; reports whether it did
    fn optional(&mut self, title: &str, tag: &str, body: &str) -> bool {
        if body.trim().is_empty() {
            return false;
        }
        self.section(title, tag, body);
        true
    }

    fn paragraph(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push_str("\n\n");
    }

    fn checklist(&mut self, items: &[&str]) {
        match self.target {
            PromptTarget::Claude => {
                self.buf.push_str(
                    "<checklist>\nBefore finalising, confirm each of the following:\n",
                );
                for item in items {
                    let _ = writeln!(self.buf, "- [ ] {}", item);
                }
                self.buf.push_str("</checklist>\n");
            }
            PromptTarget::Gemini => {
                self.buf
                    .push_str("## Checklist\n\nBefore finalising, confirm each of the following:\n\n");
                for item in items {
                    let _ = writeln!(self.buf, "- [ ] {}", item);
                }
            }
        }
    }

    fn finish(self) -> String {
        let mut buf = self.buf;
        let trimmed = buf.trim_end().len();
        buf.truncate(trimmed);
        buf.push('\n');
        buf
    }
}
