//! Session save, load and export
//!
//! A session is a `SessionDocument` kept under one fixed key in a
//! `KeyValueStore`. Saving overwrites the previous value. Loading checks
//! the document shape before the form is touched, so a bad document leaves
//! the form exactly as it was.

pub mod document;
pub mod storage;

pub use document::{SessionDocument, REQUIRED_KEYS, SESSION_VERSION};
pub use storage::{KeyValueStore, MemoryStore};

use chrono::{NaiveDate, Utc};

use crate::config::SessionConfig;
use crate::error::{Result, SubsError};
use crate::state::FormState;
use crate::sync::FormStore;

/// File name offered when exporting a session
pub fn export_file_name(date: NaiveDate) -> String {
    format!("submissions-session-{}.json", date.format("%Y-%m-%d"))
}

/// Replace the form with a checked document
pub fn apply(doc: &SessionDocument, form: &mut FormStore) {
    form.replace_state(doc.to_state());
}

pub struct SessionManager<S: KeyValueStore> {
    store: S,
    config: SessionConfig,
}

impl<S: KeyValueStore> SessionManager<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot the form with the current time
    pub fn save(&self, state: &FormState) -> SessionDocument {
        SessionDocument::capture(state, &self.config.app_name, Utc::now())
    }

    /// Save the form to storage, replacing any earlier session
    pub fn persist(&mut self, state: &FormState) -> Result<SessionDocument> {
        let doc = self.save(state);
        self.store
            .set_item(&self.config.storage_key, &doc.to_json()?)?;
        tracing::info!(key = %self.config.storage_key, "session saved");
        Ok(doc)
    }

    pub fn has_saved(&self) -> bool {
        matches!(self.store.get_item(&self.config.storage_key), Ok(Some(_)))
    }

    /// Read and check the stored session
    pub fn load(&self) -> Result<SessionDocument> {
        let json = self
            .store
            .get_item(&self.config.storage_key)?
            .ok_or_else(|| SubsError::NotFound(self.config.storage_key.clone()))?;
        SessionDocument::parse(&json).map_err(|e| {
            tracing::warn!(key = %self.config.storage_key, "stored session rejected: {}", e);
            e
        })
    }

    /// Load the stored session into the form
    pub fn restore(&self, form: &mut FormStore) -> Result<SessionDocument> {
        let doc = self.load()?;
        apply(&doc, form);
        tracing::info!(saved_at = %doc.timestamp, "session restored");
        Ok(doc)
    }

    /// Remove the stored session
    pub fn clear(&mut self) -> Result<()> {
        self.store.remove_item(&self.config.storage_key)?;
        tracing::info!(key = %self.config.storage_key, "saved session cleared");
        Ok(())
    }

    /// Pretty JSON for a downloaded session file
    pub fn export_json(&self, state: &FormState) -> Result<String> {
        self.save(state).to_json_pretty()
    }

    /// Load a user-supplied session file into the form
    pub fn import_json(&self, json: &str, form: &mut FormStore) -> Result<SessionDocument> {
        let doc = SessionDocument::parse(json).map_err(|e| {
            tracing::warn!("imported session rejected: {}", e);
            e
        })?;
        apply(&doc, form);
        tracing::info!("session imported");
        Ok(doc)
    }

    /// Export file name for today
    pub fn export_file_name(&self) -> String {
        export_file_name(Utc::now().date_naive())
    }
}
