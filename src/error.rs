//! Error types for the contract-risk library.
//!
//! Three layers of failure, one type each:
//!
//! * [`ExtractionError`]: a supported document could not be turned into
//!   text (corrupt PDF, DOCX without a body part, …). Always names the format.
//!
//! * [`RemoteServiceError`]: the reasoning service failed or answered with
//!   something that does not match the expected JSON shape.
//!
//! * [`AnalysisError`]: the per-request error returned by
//!   [`crate::analyze::Analyzer::analyze`]. It wraps the two above and adds
//!   the precondition failures (missing credential, missing file, wrong media
//!   type, empty text). Every variant maps to exactly one
//!   [`ErrorCategory`], which the HTTP layer turns into a status code.
//!
//! Nothing here is retried: every error is terminal for its request.

use thiserror::Error;

/// Message shown to the user for any rejected media type.
pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Invalid file type. Please upload a PDF or DOCX file.";

/// Message returned when the reasoning-service credential is absent.
pub const NOT_CONFIGURED_MESSAGE: &str = "Contract analysis service is not configured";

/// Generic message used instead of upstream error text when redaction is on.
pub const REDACTED_REMOTE_MESSAGE: &str =
    "The analysis service could not process this document. Please try again later.";

/// Who is to blame for a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The uploaded data or form was unusable. HTTP 400.
    Client,
    /// Configuration, upstream or internal failure. HTTP 500.
    Server,
}

impl ErrorCategory {
    /// HTTP status code for this category.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorCategory::Client => 400,
            ErrorCategory::Server => 500,
        }
    }
}

/// All errors a single analysis request can end with.
#[derive(Debug, Error)]
pub enum AnalysisError {
    // ── Configuration ─────────────────────────────────────────────────────
    /// No usable credential for the reasoning service. The hint is logged,
    /// never shown to the client.
    #[error("Contract analysis service is not configured")]
    NotConfigured { hint: String },

    // ── Client input ──────────────────────────────────────────────────────
    /// The form carried no `file` field.
    #[error("No file provided")]
    MissingFile,

    /// The declared media type is not PDF or DOCX.
    #[error("Invalid file type. Please upload a PDF or DOCX file.")]
    UnsupportedMediaType { media_type: Option<String> },

    /// The multipart body itself could not be read.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Extraction succeeded but produced only whitespace.
    #[error("Could not extract text from the document")]
    EmptyText,

    /// Extraction failed for a supported format.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    // ── Upstream ──────────────────────────────────────────────────────────
    /// The reasoning service failed or answered with an unusable shape.
    #[error(transparent)]
    Remote(#[from] RemoteServiceError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task was cancelled).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Failure category used to pick the HTTP status.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::MissingFile
            | AnalysisError::UnsupportedMediaType { .. }
            | AnalysisError::InvalidUpload(_)
            | AnalysisError::EmptyText
            | AnalysisError::Extraction(_) => ErrorCategory::Client,
            AnalysisError::NotConfigured { .. }
            | AnalysisError::Remote(_)
            | AnalysisError::InvalidConfig(_)
            | AnalysisError::Internal(_) => ErrorCategory::Server,
        }
    }

    /// The message sent back to the client.
    ///
    /// With `redact_upstream` set, reasoning-service errors are replaced by
    /// [`REDACTED_REMOTE_MESSAGE`]; every other message is already written for
    /// end users and is returned as-is.
    pub fn client_message(&self, redact_upstream: bool) -> String {
        match self {
            AnalysisError::Remote(_) if redact_upstream => REDACTED_REMOTE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// A supported document could not be converted to text.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("Failed to parse PDF: {detail}")]
    Pdf { detail: String },

    #[error("Failed to parse DOCX: {detail}")]
    Docx { detail: String },
}

/// The reasoning service call failed or returned an unusable reply.
#[derive(Debug, Clone, Error)]
pub enum RemoteServiceError {
    /// Transport or provider-level failure (network, auth, rate limit, …).
    #[error("{0}")]
    Request(String),

    /// The call exceeded the configured timeout.
    #[error("Analysis service timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The reply was not valid JSON.
    #[error("Analysis service returned malformed JSON: {detail}")]
    Malformed { detail: String },

    /// The reply was JSON but did not match the expected shape.
    #[error("Analysis service returned an invalid '{field}' field: expected {expected}")]
    Schema {
        field: &'static str,
        expected: &'static str,
    },
}
