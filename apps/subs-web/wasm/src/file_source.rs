//! Browser `File` objects as upload sources

use async_trait::async_trait;
use subs_core::{ContentSource, Result, SubsError, UploadedDocument};
use wasm_bindgen_futures::JsFuture;

use crate::storage::js_message;

pub struct FileSource(web_sys::File);

#[async_trait(?Send)]
impl ContentSource for FileSource {
    async fn read_bytes(&self) -> Result<Vec<u8>> {
        let buffer = JsFuture::from(self.0.array_buffer())
            .await
            .map_err(|e| SubsError::Extraction(format!("Failed to read file: {}", js_message(&e))))?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }
}

/// Wrap a selected or dropped file; nothing is read yet
pub fn upload_from_file(file: web_sys::File) -> UploadedDocument<FileSource> {
    UploadedDocument {
        name: file.name(),
        mime_type: file.type_(),
        size_bytes: file.size() as u64,
        source: FileSource(file),
    }
}
