//! Format dispatch and the extracted-text window.

use crate::document::{DocumentKind, UploadedDocument};
use crate::error::{AnalysisError, ExtractionError};
use crate::pipeline::{docx, pdf};
use once_cell::sync::Lazy;
use regex::Regex;

/// Turns an uploaded document into plain text.
///
/// Implementations are called from `spawn_blocking`, so they may block.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError>;
}

/// Default extractor: PDF via `pdf-extract`, DOCX via the OOXML body part.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatExtractor;

impl TextExtractor for FormatExtractor {
    fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError> {
        match document.kind() {
            DocumentKind::Pdf => pdf::extract_text(document.bytes()),
            DocumentKind::Docx => docx::extract_text(document.bytes()),
        }
    }
}

/// Document text, cleaned and cut to the character window.
///
/// Never empty: [`ExtractedText::new`] refuses whitespace-only input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    text: String,
    original_chars: usize,
    truncated: bool,
}

impl ExtractedText {
    /// Clean `raw`, reject it if nothing is left, and keep at most
    /// `max_chars` characters.
    pub fn new(raw: &str, max_chars: usize) -> Result<Self, AnalysisError> {
        let cleaned = clean_text(raw);
        if cleaned.is_empty() {
            return Err(AnalysisError::EmptyText);
        }
        let original_chars = cleaned.chars().count();
        let (text, truncated) = match cleaned.char_indices().nth(max_chars) {
            Some((cut, _)) => (cleaned[..cut].to_string(), true),
            None => (cleaned, false),
        };
        Ok(Self {
            text,
            original_chars,
            truncated,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Character count before the window was applied.
    pub fn original_chars(&self) -> usize {
        self.original_chars
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

static RE_BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static RE_INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{A0}]{2,}").unwrap());

/// Normalise line endings, squeeze runs of spaces and blank lines, trim.
fn clean_text(raw: &str) -> String {
    let s = raw.replace("\r\n", "\n").replace('\r', "\n");
    let s = s
        .replace(['\u{200B}', '\u{FEFF}', '\u{00AD}'], "")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let s = RE_INLINE_SPACE.replace_all(&s, " ");
    let s = RE_BLANK_RUNS.replace_all(&s, "\n\n");
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_is_empty() {
        for raw in ["", "   ", "\n\n\t\r\n", "\u{FEFF}  \u{200B}"] {
            assert!(matches!(
                ExtractedText::new(raw, 100),
                Err(AnalysisError::EmptyText)
            ));
        }
    }

    #[test]
    fn keeps_first_n_chars() {
        let t = ExtractedText::new("abcdefghij", 4).unwrap();
        assert_eq!(t.as_str(), "abcd");
        assert!(t.is_truncated());
        assert_eq!(t.original_chars(), 10);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let t = ExtractedText::new("ééééé", 3).unwrap();
        assert_eq!(t.as_str(), "ééé");
    }

    #[test]
    fn short_text_untouched() {
        let t = ExtractedText::new("  Lease Agreement  ", 100).unwrap();
        assert_eq!(t.as_str(), "Lease Agreement");
        assert!(!t.is_truncated());
    }

    #[test]
    fn blank_runs_collapsed() {
        let t = ExtractedText::new("Clause 1\r\n\r\n\r\n\r\nClause 2   end", 100).unwrap();
        assert_eq!(t.as_str(), "Clause 1\n\nClause 2 end");
    }

    #[test]
    fn dispatches_on_kind() {
        let doc = UploadedDocument::new(DocumentKind::Docx, b"not a zip".to_vec());
        let err = FormatExtractor.extract(&doc).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx { .. }));

        let doc = UploadedDocument::new(DocumentKind::Pdf, b"not a pdf".to_vec());
        let err = FormatExtractor.extract(&doc).unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf { .. }));
    }
}
