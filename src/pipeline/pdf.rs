//! PDF text extraction via `pdf-extract`.
//!
//! pdf-extract can panic on hostile or unusual inputs (broken font tables,
//! odd encodings). The panic is caught here and reported like any other
//! parse failure so one bad upload cannot take the blocking thread down
//! with an opaque join error.

use crate::error::ExtractionError;
use std::panic;
use tracing::{debug, warn};

/// Extract the text layer of an in-memory PDF.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    if !bytes.starts_with(b"%PDF") {
        return Err(ExtractionError::Pdf {
            detail: "missing %PDF header".to_string(),
        });
    }

    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => {
            debug!("PDF: extracted {} chars from {} bytes", text.len(), bytes.len());
            Ok(text)
        }
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {}", e);
            Err(ExtractionError::Pdf {
                detail: e.to_string(),
            })
        }
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "parser panicked".to_string());
            warn!("PDF extraction panicked: {}", detail);
            Err(ExtractionError::Pdf { detail })
        }
    }
}
