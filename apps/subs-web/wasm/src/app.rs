//! The application context the page talks to
//!
//! `SubsApp` owns the form store, the ingestor and the session manager.
//! JavaScript forwards input events and file selections to it and reads
//! back state, validation and reports.
//!
//! Observers run while the form is mutably borrowed, so field-change events
//! are queued and handed to JS callbacks only after the borrow is released.
//! Every exported method takes `&self` and keeps its mutable state in cells,
//! so a callback may call straight back into the app.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use js_sys::{Function, Promise};
use serde::Serialize;
use subs_core::{
    compose_all, counter_label, ComposedPrompt, ContentSource, FieldChanged, FieldName,
    FieldObserver, FormState, FormStore, IngestReport, Ingestor, KeyValueStore, MemoryStore,
    SessionDocument, SessionManager, SubsConfig, SubsError, UploadedDocument, ValidationResult,
    Validator,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::file_source::upload_from_file;
use crate::logging;
use crate::storage::{js_message, BrowserStorage};

/// Payload passed to `onFieldChanged` callbacks
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldEvent {
    field: FieldName,
    char_count: usize,
    counter_label: String,
    validation: ValidationResult,
}

struct QueueObserver(Rc<RefCell<Vec<FieldEvent>>>);

impl FieldObserver for QueueObserver {
    fn on_field_changed(
        &mut self,
        event: &FieldChanged,
        _state: &FormState,
        validation: &ValidationResult,
    ) {
        self.0.borrow_mut().push(FieldEvent {
            field: event.field,
            char_count: event.char_count,
            counter_label: counter_label(event.char_count),
            validation: validation.clone(),
        });
    }
}

#[derive(Clone, Default)]
struct Notifier {
    pending: Rc<RefCell<Vec<FieldEvent>>>,
    callbacks: Rc<RefCell<Vec<Function>>>,
}

impl Notifier {
    fn observer(&self) -> Box<dyn FieldObserver> {
        Box::new(QueueObserver(self.pending.clone()))
    }

    /// Deliver queued events; call only while the form is not borrowed
    fn flush(&self) {
        let events = std::mem::take(&mut *self.pending.borrow_mut());
        let callbacks = self.callbacks.borrow().clone();
        if callbacks.is_empty() {
            return;
        }
        for event in events {
            let payload = match serde_wasm_bindgen::to_value(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!("failed to serialize field event: {}", e);
                    continue;
                }
            };
            for callback in &callbacks {
                if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
                    tracing::warn!(field = %event.field, "field change callback threw: {}", js_message(&e));
                }
            }
        }
    }
}

#[wasm_bindgen]
pub struct SubsApp {
    form: Rc<RefCell<FormStore>>,
    sessions: RefCell<SessionManager<Box<dyn KeyValueStore>>>,
    ingestor: Ingestor,
    notifier: Notifier,
    strict_ingest_order: Cell<bool>,
}

#[wasm_bindgen]
impl SubsApp {
    /// Create the app with default settings and `localStorage` sessions
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<SubsApp, JsValue> {
        Self::with_config("{}")
    }

    /// Create the app from a JSON configuration object
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str) -> Result<SubsApp, JsValue> {
        let config = SubsConfig::from_json(config_json).map_err(to_js_error)?;
        logging::init(config.log.level().map_err(to_js_error)?);

        let store: Box<dyn KeyValueStore> = match BrowserStorage::local() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                tracing::warn!("localStorage unavailable, sessions will not persist: {}", e);
                Box::new(MemoryStore::new())
            }
        };
        Ok(Self::build(config, store))
    }

    /// Write a field by wire name
    ///
    /// Input events never throw: an unknown name or bad enum value is logged
    /// and ignored, and `false` is returned.
    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&self, name: &str, value: &str) -> bool {
        match self.set_field_internal(name, value) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(field = %name, kind = ?e.kind(), "ignored field write");
                false
            }
        }
    }

    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        to_js_value(self.form.borrow().state())
    }

    pub fn validation(&self) -> Result<JsValue, JsValue> {
        to_js_value(self.form.borrow().validation())
    }

    #[wasm_bindgen(js_name = canGenerate)]
    pub fn can_generate(&self) -> bool {
        self.form.borrow().validation().can_generate()
    }

    #[wasm_bindgen(js_name = progressLabel)]
    pub fn progress_label(&self) -> String {
        self.form.borrow().validation().progress_label()
    }

    #[wasm_bindgen(js_name = counterLabel)]
    pub fn counter_label(&self, field: &str) -> Result<String, JsValue> {
        let field: FieldName = field.parse().map_err(to_js_error)?;
        Ok(self.form.borrow().counter_label(field))
    }

    /// Drop results from uploads superseded by a newer one
    ///
    /// Off by default: whichever ingestion finishes last is applied.
    #[wasm_bindgen(js_name = setStrictIngestOrder)]
    pub fn set_strict_ingest_order(&self, strict: bool) {
        self.strict_ingest_order.set(strict);
    }

    /// Ingest a browser `File` into the template text
    ///
    /// Resolves to an ingest report (failures included), or `null` when the
    /// upload was superseded in strict ordering mode.
    #[wasm_bindgen(js_name = ingestFile)]
    pub fn ingest_file(&self, file: web_sys::File) -> Promise {
        let task = self.ingest_task(upload_from_file(file));
        future_to_promise(async move {
            match task.await {
                Some(report) => to_js_value(&report),
                None => Ok(JsValue::NULL),
            }
        })
    }

    /// Ingest raw bytes, for drops that arrive as data
    #[wasm_bindgen(js_name = ingestBytes)]
    pub fn ingest_bytes(&self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Promise {
        let task = self.ingest_task(UploadedDocument::from_bytes(name, mime_type, bytes));
        future_to_promise(async move {
            match task.await {
                Some(report) => to_js_value(&report),
                None => Ok(JsValue::NULL),
            }
        })
    }

    /// Compose the prompts for the selected platform(s)
    pub fn generate(&self) -> Result<JsValue, JsValue> {
        let prompts = self
            .generate_internal()
            .map_err(|e| JsValue::from_str(&e))?;
        to_js_value(&prompts)
    }

    #[wasm_bindgen(js_name = saveSession)]
    pub fn save_session(&self) -> Result<String, JsValue> {
        self.save_session_internal().map_err(to_js_error)?;
        Ok("Session saved successfully".to_string())
    }

    #[wasm_bindgen(js_name = loadSession)]
    pub fn load_session(&self) -> Result<String, JsValue> {
        self.load_session_internal().map_err(to_js_error)?;
        Ok("Session loaded successfully".to_string())
    }

    #[wasm_bindgen(js_name = hasSavedSession)]
    pub fn has_saved_session(&self) -> bool {
        self.sessions.borrow().has_saved()
    }

    #[wasm_bindgen(js_name = clearSavedSession)]
    pub fn clear_saved_session(&self) -> Result<(), JsValue> {
        self.sessions.borrow_mut().clear().map_err(to_js_error)
    }

    /// Pretty JSON of the current form for download
    #[wasm_bindgen(js_name = exportSession)]
    pub fn export_session(&self) -> Result<String, JsValue> {
        self.sessions
            .borrow()
            .export_json(self.form.borrow().state())
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = exportFileName)]
    pub fn export_file_name(&self) -> String {
        self.sessions.borrow().export_file_name()
    }

    #[wasm_bindgen(js_name = importSession)]
    pub fn import_session(&self, json: &str) -> Result<String, JsValue> {
        self.import_session_internal(json).map_err(to_js_error)?;
        Ok("Session imported successfully".to_string())
    }

    /// Clear every field back to its default
    pub fn reset(&self) {
        self.form.borrow_mut().reset();
        self.notifier.flush();
    }

    /// Register a callback run after every field change
    ///
    /// Callback signature: (event: { field, charCount, counterLabel, validation }) => void
    #[wasm_bindgen(js_name = onFieldChanged)]
    pub fn on_field_changed(&self, callback: Function) {
        self.notifier.callbacks.borrow_mut().push(callback);
    }
}

impl SubsApp {
    /// Assemble the app around any session store
    pub fn build(config: SubsConfig, store: Box<dyn KeyValueStore>) -> Self {
        let notifier = Notifier::default();
        let mut form = FormStore::new(Validator::new(config.validation.clone()));
        form.subscribe(notifier.observer());

        Self {
            form: Rc::new(RefCell::new(form)),
            sessions: RefCell::new(SessionManager::new(store, config.session.clone())),
            ingestor: Ingestor::new(config.ingest),
            notifier,
            strict_ingest_order: Cell::new(false),
        }
    }

    pub fn state(&self) -> FormState {
        self.form.borrow().state().clone()
    }

    fn set_field_internal(&self, name: &str, value: &str) -> subs_core::Result<FieldChanged> {
        let result = self.form.borrow_mut().set_field(name, value);
        self.notifier.flush();
        result
    }

    fn generate_internal(&self) -> Result<Vec<ComposedPrompt>, String> {
        let form = self.form.borrow();
        let validation = form.validation();
        if !validation.can_generate() {
            let missing: Vec<&str> = validation
                .warnings
                .iter()
                .map(|w| w.message.as_str())
                .collect();
            return Err(missing.join("; "));
        }
        Ok(compose_all(form.state()))
    }

    /// Run one ingestion and commit it; the future owns everything it needs
    fn ingest_task<S: ContentSource + 'static>(
        &self,
        upload: UploadedDocument<S>,
    ) -> impl Future<Output = Option<IngestReport>> + 'static {
        let form = self.form.clone();
        let ingestor = self.ingestor.clone();
        let notifier = self.notifier.clone();
        let ticket = if self.strict_ingest_order.get() {
            Some(form.borrow_mut().begin_ingest())
        } else {
            None
        };

        async move {
            let result = ingestor.ingest(upload).await;
            let report = match ticket {
                Some(ticket) => form.borrow_mut().commit_ingest_if_current(ticket, result),
                None => Some(form.borrow_mut().commit_ingest(result)),
            };
            notifier.flush();
            report
        }
    }

    fn save_session_internal(&self) -> subs_core::Result<SessionDocument> {
        let state = self.form.borrow().state().clone();
        self.sessions.borrow_mut().persist(&state)
    }

    fn load_session_internal(&self) -> subs_core::Result<SessionDocument> {
        let result = self
            .sessions
            .borrow()
            .restore(&mut self.form.borrow_mut());
        self.notifier.flush();
        result
    }

    fn import_session_internal(&self, json: &str) -> subs_core::Result<SessionDocument> {
        let result = self
            .sessions
            .borrow()
            .import_json(json, &mut self.form.borrow_mut());
        self.notifier.flush();
        result
    }
}

fn to_js_error(e: SubsError) -> JsValue {
    JsValue::from_str(&e.status_message())
}

fn to_js_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}


#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_callback_can_read_back_into_app() {
        let app = Rc::new(SubsApp::build(
            SubsConfig::default(),
            Box::new(MemoryStore::new()),
        ));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let reader = app.clone();
        let sink = seen.clone();
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| {
            sink.borrow_mut()
                .push((reader.state().chronology, reader.can_generate()));
        });
        app.on_field_changed(callback.as_ref().unchecked_ref::<Function>().clone());

        assert!(app.set_field("chronology", "1 June: hearing listed"));
        app.reset();

        let seen = seen.borrow();
        assert_eq!(seen[0], ("1 June: hearing listed".to_string(), false));
        // reset publishes every field
        assert_eq!(seen.len(), 1 + FieldName::ALL.len());
        assert!(seen[1..].iter().all(|entry| *entry == (String::new(), false)));
        drop(callback);
    }
}
