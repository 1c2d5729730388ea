//! The single writer of the form
//!
//! `FormStore` owns the `FormState` and applies every write in call order.
//! After each write it refreshes the character counter for the field,
//! recomputes validation, and publishes a `FieldChanged` message to the
//! subscribed observers (the page subscribes one to refresh its widgets).

use std::collections::BTreeMap;

use crate::error::Result;
use crate::ingest::{IngestReport, IngestResult};
use crate::state::{FieldName, FormState};
use crate::validation::{ValidationResult, Validator};

/// Published after every successful field write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChanged {
    pub field: FieldName,
    /// Unicode scalar count; zero for non-text fields
    pub char_count: usize,
}

pub fn counter_label(count: usize) -> String {
    match count {
        1 => "1 character".to_string(),
        n => format!("{} characters", n),
    }
}

/// Consumer of field writes, called synchronously in subscription order
pub trait FieldObserver {
    fn on_field_changed(
        &mut self,
        event: &FieldChanged,
        state: &FormState,
        validation: &ValidationResult,
    );
}

/// Handed out when an ingestion starts, for callers that want to drop
/// results from uploads superseded by a newer one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IngestTicket(u64);

pub struct FormStore {
    state: FormState,
    counters: BTreeMap<FieldName, usize>,
    validator: Validator,
    validation: ValidationResult,
    observers: Vec<Box<dyn FieldObserver>>,
    latest_ingest: u64,
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new(Validator::default())
    }
}

impl FormStore {
    pub fn new(validator: Validator) -> Self {
        let state = FormState::default();
        let validation = validator.validate(&state);
        let counters = FieldName::TEXT.iter().map(|f| (*f, 0)).collect();
        Self {
            state,
            counters,
            validator,
            validation,
            observers: Vec::new(),
            latest_ingest: 0,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn subscribe(&mut self, observer: Box<dyn FieldObserver>) {
        self.observers.push(observer);
    }

    pub fn char_count(&self, field: FieldName) -> usize {
        self.counters.get(&field).copied().unwrap_or(0)
    }

    /// Counter text shown under a textarea
    pub fn counter_label(&self, field: FieldName) -> String {
        counter_label(self.char_count(field))
    }

    /// Write a field by its wire name
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<FieldChanged> {
        let field: FieldName = name.parse()?;
        self.set(field, value)
    }

    pub fn set(&mut self, field: FieldName, value: &str) -> Result<FieldChanged> {
        self.state.set(field, value)?;
        tracing::debug!(field = %field, len = value.len(), "field updated");
        Ok(self.publish(field))
    }

    /// Replace the whole form, as a session load does
    pub fn replace_state(&mut self, state: FormState) {
        self.state = state;
        for field in FieldName::ALL {
            self.publish(field);
        }
    }

    /// Clear every field back to its default
    pub fn reset(&mut self) {
        self.replace_state(FormState::default());
        tracing::info!("form cleared");
    }

    /// Start tracking an ingestion for `commit_ingest_if_current`
    pub fn begin_ingest(&mut self) -> IngestTicket {
        self.latest_ingest += 1;
        IngestTicket(self.latest_ingest)
    }

    /// Apply an ingestion outcome; whichever completes last wins
    ///
    /// On failure the template text is left as it was.
    pub fn commit_ingest(&mut self, result: IngestResult) -> IngestReport {
        match result {
            Ok(ingested) => {
                let report = IngestReport::success(&ingested);
                self.state.template_text = ingested.text;
                self.publish(FieldName::TemplateText);
                tracing::info!(
                    file = %report.file_name,
                    chars = report.char_count,
                    "document text committed"
                );
                report
            }
            Err(failure) => {
                tracing::warn!(
                    file = %failure.file_name,
                    kind = ?failure.error.kind(),
                    "ingestion failed: {}",
                    failure.error
                );
                IngestReport::failure(&failure.file_name, &failure.error)
            }
        }
    }

    /// Apply an ingestion outcome only if no newer ingestion has started
    ///
    /// Returns `None` when the ticket is stale; the result is dropped.
    pub fn commit_ingest_if_current(
        &mut self,
        ticket: IngestTicket,
        result: IngestResult,
    ) -> Option<IngestReport> {
        if ticket.0 != self.latest_ingest {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest_ingest,
                "dropping superseded ingestion"
            );
            return None;
        }
        Some(self.commit_ingest(result))
    }

    fn publish(&mut self, field: FieldName) -> FieldChanged {
        let char_count = self
            .state
            .text(field)
            .map(|value| value.chars().count())
            .unwrap_or(0);
        if field.is_text() {
            self.counters.insert(field, char_count);
        }
        self.validation = self.validator.validate(&self.state);

        let event = FieldChanged { field, char_count };
        for observer in self.observers.iter_mut() {
            observer.on_field_changed(&event, &self.state, &self.validation);
        }
        event
    }
}
