//! `localStorage` as a session store

use subs_core::{KeyValueStore, Result, SubsError};
use wasm_bindgen::JsValue;

pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    /// The page's `localStorage`
    pub fn local() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| SubsError::Storage("No window".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| SubsError::Storage("localStorage is not available".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        // quota errors surface here
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

pub(crate) fn js_error(value: JsValue) -> SubsError {
    SubsError::Storage(js_message(&value))
}

/// Best-effort text of a thrown JS value
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
