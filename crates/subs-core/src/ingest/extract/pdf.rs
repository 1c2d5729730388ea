//! PDF text extraction
//!
//! Walks each page's content stream with lopdf and joins the pages in order
//! with a separator. Text strings are decoded as UTF-8, then UTF-16BE (with
//! BOM), then Latin-1. When the walk finds no usable text (unusual font
//! encodings, mostly) the whole document is retried with pdf-extract, which
//! handles ToUnicode CMaps but does not keep page boundaries. pdf-extract
//! panics on some malformed font dictionaries, so the retry is isolated with
//! `catch_unwind`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use lopdf::content::Content;
use lopdf::{Document, Object};

use super::{Extracted, TextExtractor};
use crate::error::{Result, SubsError};

/// Share of replacement / private-use characters treated as failed decoding
const GARBAGE_THRESHOLD: f64 = 0.15;

pub struct PdfExtractor {
    page_separator: String,
}

impl PdfExtractor {
    pub fn new(page_separator: &str) -> Self {
        Self {
            page_separator: page_separator.to_string(),
        }
    }

    fn fallback(&self, data: &[u8]) -> Option<String> {
        let extracted = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(data)
        }));
        match extracted {
            Ok(Ok(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(Ok(_)) => None,
            Ok(Err(e)) => {
                tracing::debug!("pdf-extract fallback failed: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("pdf-extract fallback panicked");
                None
            }
        }
    }
}

impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn can_handle(&self, data: &[u8]) -> bool {
        data.starts_with(b"%PDF-")
    }

    fn extract(&self, data: &[u8]) -> Result<Extracted> {
        if !self.can_handle(data) {
            return Err(SubsError::Extraction(
                "Not a valid PDF file (missing %PDF- header)".to_string(),
            ));
        }

        let document = Document::load_mem(data)
            .map_err(|e| SubsError::Extraction(format!("Failed to parse PDF: {}", e)))?;

        let pages = page_texts(&document);
        let page_count = pages.len() as u32;
        if page_count == 0 {
            return Err(SubsError::Extraction("PDF has no pages".to_string()));
        }

        let mut warnings = Vec::new();
        if document.is_encrypted() {
            warnings.push("Document is encrypted; extracted text may be incomplete".to_string());
        }

        let joined = pages.join(&self.page_separator);
        let usable = !joined.trim().is_empty() && garbage_ratio(&joined) <= GARBAGE_THRESHOLD;

        let text = if usable {
            joined
        } else if let Some(text) = self.fallback(data) {
            warnings.push("Page boundaries could not be preserved for this PDF".to_string());
            text
        } else if !joined.trim().is_empty() {
            warnings.push("Some characters could not be decoded".to_string());
            joined
        } else {
            return Err(SubsError::Extraction(
                "No extractable text found (the PDF may be a scanned image)".to_string(),
            ));
        };

        Ok(Extracted {
            text,
            page_count: Some(page_count),
            warnings,
        })
    }
}

/// Text of every page, in page order
fn page_texts(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let mut page_text = String::new();
            if let Ok(content) = doc.get_page_content(page_id) {
                if let Ok(content) = Content::decode(&content) {
                    for op in content.operations {
                        match op.operator.as_str() {
                            "Tj" | "TJ" => push_operands(&mut page_text, &op.operands),
                            "'" | "\"" => {
                                new_line(&mut page_text);
                                push_operands(&mut page_text, &op.operands);
                            }
                            "T*" | "ET" => new_line(&mut page_text),
                            "Td" | "TD" => {
                                let moves_down = op
                                    .operands
                                    .get(1)
                                    .and_then(|ty| ty.as_float().ok())
                                    .map(|ty| ty != 0.0)
                                    .unwrap_or(false);
                                if moves_down {
                                    new_line(&mut page_text);
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            page_text.trim_end().to_string()
        })
        .collect()
}

fn new_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn push_operands(text: &mut String, operands: &[Object]) {
    for operand in operands {
        if let Some(s) = decode_operand(operand) {
            text.push_str(&s);
        }
    }
}

fn decode_operand(operand: &Object) -> Option<String> {
    match operand {
        Object::String(bytes, _) => Some(decode_string(bytes)),
        Object::Array(items) => {
            let mut text = String::new();
            for item in items {
                match item {
                    Object::String(bytes, _) => text.push_str(&decode_string(bytes)),
                    // large negative kerning is a word gap
                    Object::Integer(n) if *n < -100 => text.push(' '),
                    Object::Real(n) if *n < -100.0 => text.push(' '),
                    _ => {}
                }
            }
            Some(text)
        }
        _ => None,
    }
}

fn decode_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&units) {
            return s;
        }
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    bytes.iter().map(|&b| b as char).collect()
}

fn garbage_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut garbage = 0usize;
    for c in text.chars() {
        total += 1;
        if c == '\u{FFFD}' || ('\u{E000}'..='\u{F8FF}').contains(&c) {
            garbage += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    garbage as f64 / total as f64
}
