//! Word (.docx) raw text extraction
//!
//! A .docx file is a zip archive; the body lives in `word/document.xml`.
//! Only run text is kept. Paragraphs become blank-line separated blocks,
//! tabs and breaks are preserved, and everything else (styles, fields,
//! images, macros) is ignored.

use std::io::{Cursor, Read};

use lazy_static::lazy_static;
use regex::Regex;
use zip::ZipArchive;

use super::{Extracted, TextExtractor};
use crate::config::IngestConfig;
use crate::error::{Result, SubsError};
use crate::format_bytes;

const DOCUMENT_PART: &str = "word/document.xml";
const MACRO_PART: &str = "word/vbaProject.bin";
const EMBEDDINGS_DIR: &str = "word/embeddings/";

lazy_static! {
    /// Run text, tabs, line breaks and paragraph ends, in document order.
    /// Empty self-closing runs come first so they never open a text capture.
    static ref BODY_TOKEN: Regex = Regex::new(
        r"(?s)<w:t(?:\s[^>]*)?/>|<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab\s*/>|<w:br\b[^>]*/>|<w:cr\s*/>|</w:p>"
    )
    .unwrap();
}

pub struct WordExtractor {
    max_part_bytes: u64,
}

impl WordExtractor {
    /// `max_part_bytes` caps the decompressed size of the document body
    pub fn new(max_part_bytes: u64) -> Self {
        Self { max_part_bytes }
    }

    fn too_large(&self) -> SubsError {
        SubsError::Extraction(format!(
            "Word document body expands beyond {}",
            format_bytes(self.max_part_bytes)
        ))
    }
}

impl Default for WordExtractor {
    fn default() -> Self {
        Self::new(IngestConfig::default().max_expanded_bytes)
    }
}

impl TextExtractor for WordExtractor {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn can_handle(&self, data: &[u8]) -> bool {
        data.starts_with(b"PK\x03\x04")
    }

    fn extract(&self, data: &[u8]) -> Result<Extracted> {
        if !self.can_handle(data) {
            return Err(SubsError::Extraction(
                "Not a valid Word document (not a zip archive)".to_string(),
            ));
        }

        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| SubsError::Extraction(format!("Failed to open Word document: {}", e)))?;

        let mut warnings = Vec::new();
        if archive.file_names().any(|name| name == MACRO_PART) {
            warnings.push("Document contains macros (not executed)".to_string());
        }
        if archive
            .file_names()
            .any(|name| name.starts_with(EMBEDDINGS_DIR))
        {
            warnings.push("Document contains embedded objects (ignored)".to_string());
        }

        let part = archive.by_name(DOCUMENT_PART).map_err(|_| {
            SubsError::Extraction(format!("Word document is missing {}", DOCUMENT_PART))
        })?;
        if part.size() > self.max_part_bytes {
            return Err(self.too_large());
        }

        // the declared size can lie, so the read itself is bounded too
        let mut xml = String::new();
        part.take(self.max_part_bytes + 1)
            .read_to_string(&mut xml)
            .map_err(|e| SubsError::Extraction(format!("Failed to read {}: {}", DOCUMENT_PART, e)))?;
        if xml.len() as u64 > self.max_part_bytes {
            return Err(self.too_large());
        }

        Ok(Extracted {
            text: body_text(&xml),
            page_count: None,
            warnings,
        })
    }
}

/// Raw text of a WordprocessingML body
fn body_text(xml: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    for token in BODY_TOKEN.captures_iter(xml) {
        if let Some(run) = token.get(1) {
            current.push_str(&decode_entities(run.as_str()));
            continue;
        }
        match token.get(0).map(|m| m.as_str()) {
            Some("</w:p>") => {
                if !current.trim().is_empty() {
                    paragraphs.push(current.trim_end().to_string());
                }
                current.clear();
            }
            Some(tag) if tag.starts_with("<w:tab") => current.push('\t'),
            Some(tag) if tag.starts_with("<w:br") || tag.starts_with("<w:cr") => {
                current.push('\n')
            }
            // empty run
            _ => {}
        }
    }
    if !current.trim().is_empty() {
        paragraphs.push(current.trim_end().to_string());
    }

    paragraphs.join("\n\n")
}

/// Resolve the predefined XML entities and numeric character references
fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let resolved = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let c = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((c, semi))
        });

        match resolved {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn wrap_body(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    fn build_docx(document_xml: Option<&str>, extra_parts: &[&str]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", FileOptions::default())
            .unwrap();
        writer.write_all(b"<Types/>").unwrap();
        if let Some(xml) = document_xml {
            writer.start_file(DOCUMENT_PART, FileOptions::default()).unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
        }
        for part in extra_parts {
            writer.start_file(*part, FileOptions::default()).unwrap();
            writer.write_all(b"\x00\x01").unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_become_blocks() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>Chronology</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve">1 March: </w:t></w:r><w:r><w:t>filed</w:t></w:r></w:p>"#,
        );
        let out = WordExtractor::default().extract(&build_docx(Some(&xml), &[])).unwrap();
        assert_eq!(out.text, "Chronology\n\n1 March: filed");
        assert!(out.warnings.is_empty());
        assert_eq!(out.page_count, None);
    }

    #[test]
    fn test_tabs_breaks_and_entities() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>&lt;script&gt; &amp; &#65;&#x42;</w:t></w:r></w:p>"#,
        );
        let out = WordExtractor::default().extract(&build_docx(Some(&xml), &[])).unwrap();
        assert_eq!(out.text, "a\tb\n<script> & AB");
    }

    #[test]
    fn test_table_tags_are_not_run_text() {
        let xml = wrap_body(
            r#"<w:tbl><w:tblPr/><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        let out = WordExtractor::default().extract(&build_docx(Some(&xml), &[])).unwrap();
        assert_eq!(out.text, "cell");
    }

    #[test]
    fn test_empty_self_closing_run_is_skipped() {
        assert_eq!(
            body_text(
                r#"<w:p><w:r><w:t xml:space="preserve"/></w:r></w:p><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>Heading</w:t></w:r></w:p>"#
            ),
            "Heading"
        );
        assert_eq!(
            body_text("<w:p><w:r><w:t>a</w:t><w:t/><w:t>b</w:t></w:r></w:p><w:p><w:r><w:t>c</w:t></w:r></w:p>"),
            "ab\n\nc"
        );
    }

    #[test]
    fn test_oversized_body_is_extraction_error() {
        let paragraph = "<w:p><w:r><w:t>0123456789</w:t></w:r></w:p>";
        let xml = wrap_body(&paragraph.repeat(200));
        let docx = build_docx(Some(&xml), &[]);
        assert!(docx.len() < xml.len());

        let err = WordExtractor::new(1024).extract(&docx).unwrap_err();
        assert!(matches!(err, SubsError::Extraction(msg) if msg.contains("expands beyond")));

        let out = WordExtractor::new(xml.len() as u64).extract(&docx).unwrap();
        assert!(out.text.starts_with("0123456789\n\n0123456789"));
    }

    #[test]
    fn test_macros_and_embeddings_are_reported() {
        let xml = wrap_body("<w:p><w:r><w:t>x</w:t></w:r></w:p>");
        let docx = build_docx(
            Some(&xml),
            &[MACRO_PART, "word/embeddings/oleObject1.bin"],
        );
        let out = WordExtractor::default().extract(&docx).unwrap();
        assert_eq!(out.text, "x");
        assert_eq!(
            out.warnings,
            vec![
                "Document contains macros (not executed)".to_string(),
                "Document contains embedded objects (ignored)".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_document_part_is_extraction_error() {
        let err = WordExtractor::default().extract(&build_docx(None, &[])).unwrap_err();
        assert!(matches!(err, SubsError::Extraction(msg) if msg.contains(DOCUMENT_PART)));
    }

    #[test]
    fn test_non_zip_is_extraction_error() {
        let err = WordExtractor::default().extract(b"just text pretending").unwrap_err();
        assert!(matches!(err, SubsError::Extraction(_)));
    }

    #[test]
    fn test_decode_entities_leaves_unknown_alone() {
        assert_eq!(decode_entities("AT&T &bogus; &#xZZ;"), "AT&T &bogus; &#xZZ;");
        assert_eq!(decode_entities("&quot;q&apos;"), "\"q'");
    }
}
