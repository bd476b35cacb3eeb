//! Normalisation of the reasoning-service reply into an [`AnalysisResult`].
//!
//! The service is non-deterministic, so nothing in its reply is trusted
//! beyond what is checked here:
//!
//! 1. Strip outer code fences (models add them despite the prompt)
//! 2. Parse JSON; failure → [`RemoteServiceError::Malformed`]
//! 3. `is_legal_contract` must be a boolean; `false` → canonical zero-form,
//!    every other field discarded unchecked
//! 4. For contracts: `summary` must be a string, `risks` an array of strings
//! 5. `score` is truncated and clamped into 1..=10; non-numeric → 1
//! 6. `interpretation` is recomputed from the clamped score

use crate::error::RemoteServiceError;
use crate::result::{AnalysisResult, MAX_SCORE, MIN_SCORE};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|JSON)?\s*\n(.*?)\n?```$").unwrap());

fn strip_json_fences(input: &str) -> &str {
    let trimmed = input.trim();
    match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps.get(1).map_or(trimmed, |m| m.as_str().trim()),
        None => trimmed,
    }
}

/// Parse and normalise a raw reply.
///
/// With `assume_contract` set (the user overrode the gatekeeper), the reply's
/// `is_legal_contract` verdict is ignored and the document is always scored.
pub fn normalize_reply(raw: &str, assume_contract: bool) -> Result<AnalysisResult, RemoteServiceError> {
    let body = strip_json_fences(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| RemoteServiceError::Malformed {
        detail: e.to_string(),
    })?;
    let obj = value.as_object().ok_or(RemoteServiceError::Schema {
        field: "<root>",
        expected: "a JSON object",
    })?;

    let is_contract = obj
        .get("is_legal_contract")
        .and_then(Value::as_bool)
        .ok_or(RemoteServiceError::Schema {
            field: "is_legal_contract",
            expected: "a boolean",
        })?;

    if !is_contract && !assume_contract {
        debug!("Reply classifies the document as not a contract");
        return Ok(AnalysisResult::not_a_contract());
    }

    let summary = string_field(obj, "summary")?;
    let risks = risks_field(obj)?;
    let score = clamp_score(obj.get("score"));
    debug!("Reply score {:?} normalised to {}", obj.get("score"), score);

    Ok(AnalysisResult::scored(score, summary, risks))
}

fn string_field(obj: &Map<String, Value>, field: &'static str) -> Result<String, RemoteServiceError> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        _ => Err(RemoteServiceError::Schema {
            field,
            expected: "a string",
        }),
    }
}

fn risks_field(obj: &Map<String, Value>) -> Result<Vec<String>, RemoteServiceError> {
    let err = RemoteServiceError::Schema {
        field: "risks",
        expected: "an array of strings",
    };
    let items = match obj.get("risks") {
        Some(Value::Array(items)) => items,
        _ => return Err(err),
    };
    items
        .iter()
        .map(|item| item.as_str().map(|s| s.trim().to_string()).ok_or(err.clone()))
        .filter(|r| !matches!(r, Ok(s) if s.is_empty()))
        .collect()
}

/// Clamp a free-form score into [`MIN_SCORE`]..=[`MAX_SCORE`].
///
/// Numbers and numeric strings are truncated toward zero; anything else
/// (missing, null, words, NaN) becomes [`MIN_SCORE`].
pub fn clamp_score(score: Option<&Value>) -> u8 {
    let numeric = match score {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match numeric {
        Some(n) if n.is_finite() => {
            let n = n.trunc();
            if n <= f64::from(MIN_SCORE) {
                MIN_SCORE
            } else if n >= f64::from(MAX_SCORE) {
                MAX_SCORE
            } else {
                n as u8
            }
        }
        _ => MIN_SCORE,
    }
}
