//! WASM bindings for the Submissions Synthesizer page
//!
//! All form state lives in Rust inside `SubsApp`. JavaScript forwards DOM
//! events and file selections, and renders what it reads back.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { SubsApp } from './pkg/subs_wasm.js';
//!
//! await init();
//!
//! const app = new SubsApp();
//! app.onFieldChanged((e) => updateCounter(e.field, e.counterLabel, e.validation));
//! textarea.addEventListener('input', () => app.setField('chronology', textarea.value));
//!
//! const report = await app.ingestFile(fileInput.files[0]);
//! showStatus(report.status, report.ok);
//!
//! if (app.canGenerate()) {
//!     for (const prompt of app.generate()) show(prompt.target, prompt.text);
//! }
//!
//! app.saveSession();
//! download(app.exportSession(), app.exportFileName());
//! ```

pub mod app;
pub mod file_source;
pub mod logging;
pub mod storage;

use wasm_bindgen::prelude::*;

pub use app::SubsApp;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::INFO);
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Format bytes as human-readable string
#[wasm_bindgen]
pub fn format_bytes(bytes: usize) -> String {
    subs_core::format_bytes(bytes as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(2621440), "2.5 MB");
    }
}
