//! DOCX text extraction.
//!
//! A DOCX file is a zip archive; the body lives in `word/document.xml`.
//! Text sits in `<w:t>` runs inside `<w:p>` paragraphs. We only need reading
//! order and paragraph breaks, so the part is scanned with a single regex
//! over the tags that matter instead of building a DOM.

use crate::error::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Read};
use tracing::debug;

const BODY_PART: &str = "word/document.xml";

/// Upper bound on the decompressed body part (zip-bomb guard).
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Extract the body text of an in-memory DOCX.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Docx {
        detail: format!("not a valid DOCX archive ({e})"),
    })?;

    let part = archive.by_name(BODY_PART).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => ExtractionError::Docx {
            detail: format!("archive has no {BODY_PART} part"),
        },
        other => ExtractionError::Docx {
            detail: other.to_string(),
        },
    })?;

    let mut xml = String::new();
    part.take(MAX_BODY_BYTES)
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx {
            detail: format!("unreadable {BODY_PART}: {e}"),
        })?;

    let text = document_xml_to_text(&xml);
    debug!("DOCX: extracted {} chars from {} bytes", text.len(), bytes.len());
    Ok(text)
}

// Matches, in order of alternation: a text run with its content, a tab,
// a line break, a paragraph end.
static RE_BODY_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>/]*)?>(.*?)</w:t>|<w:t(?:\s[^>]*)?/>|<w:(tab)\s*/>|<w:(br|cr)(?:\s[^>]*)?/>|</w:(p)>")
        .unwrap()
});

/// Convert the WordprocessingML body to plain text.
pub fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len() / 4);
    for caps in RE_BODY_TOKENS.captures_iter(xml) {
        if let Some(run) = caps.get(1) {
            out.push_str(&decode_entities(run.as_str()));
        } else if caps.get(2).is_some() {
            out.push('\t');
        } else if caps.get(3).is_some() {
            out.push('\n');
        } else if caps.get(4).is_some() {
            out.push('\n');
        }
    }
    out
}

static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(amp|lt|gt|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").unwrap());

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    RE_ENTITY
        .replace_all(s, |caps: &regex::Captures| {
            let name = &caps[1];
            match name {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = if let Some(hex) = name.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        name[1..].parse::<u32>().ok()
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .into_owned()
}
