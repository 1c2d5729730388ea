//! Plain text passthrough

use super::{Extracted, TextExtractor};
use crate::error::Result;

const UTF8_BOM: char = '\u{FEFF}';

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn can_handle(&self, _data: &[u8]) -> bool {
        true
    }

    fn extract(&self, data: &[u8]) -> Result<Extracted> {
        let decoded = String::from_utf8_lossy(data);
        let text = decoded
            .strip_prefix(UTF8_BOM)
            .unwrap_or(&decoded)
            .to_string();

        Ok(Extracted {
            text,
            page_count: None,
            warnings: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_passes_through_untouched() {
        let input = "<script>alert(1)</script>\n<img src=x onerror=alert(1)>";
        let out = PlainTextExtractor.extract(input.as_bytes()).unwrap();
        assert_eq!(out.text, input);
    }

    #[test]
    fn test_bom_is_dropped() {
        let out = PlainTextExtractor
            .extract(b"\xEF\xBB\xBFAffidavit of J. Smith")
            .unwrap();
        assert_eq!(out.text, "Affidavit of J. Smith");
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_rejected() {
        let out = PlainTextExtractor.extract(b"caf\xE9").unwrap();
        assert_eq!(out.text, "caf\u{FFFD}");
    }
}
