//! # contract-risk
//!
//! Upload a contract, get back a risk score.
//!
//! A stateless endpoint extracts the text of a PDF or DOCX upload, asks an
//! LLM whether it is a legal contract and how risky it is, and normalises the
//! answer into a small envelope. A client-side widget state machine drives
//! the upload and renders the result.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (multipart)
//!  │
//!  ├─ 1. Preconditions  credential configured → file present → PDF/DOCX
//!  ├─ 2. Extract        pdf-extract / OOXML body (spawn_blocking)
//!  ├─ 3. Window         clean, reject empty, keep the first 15 000 chars
//!  ├─ 4. Reason         one LLM call, bounded by a timeout
//!  └─ 5. Normalise      strict JSON schema, clamp score 1–10, relabel
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contract_risk::{Analyzer, AnalyzerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider defaults to openai; OPENAI_API_KEY must be set.
//!     let analyzer = Analyzer::new(AnalyzerConfig::default());
//!     let result = analyzer.analyze_file("lease.pdf", false).await?;
//!     println!("{}/10 {}", result.risk_score, result.interpretation);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `contract-risk` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod result;
pub mod server;
pub mod widget;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::Analyzer;
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};
pub use document::{DocumentKind, RawUpload, UploadRequest, UploadedDocument};
pub use error::{AnalysisError, ErrorCategory, ExtractionError, RemoteServiceError};
pub use result::{interpretation_for, AnalysisResult, ErrorBody};
pub use server::{router, serve, ServerConfig};
pub use widget::{HttpTransport, UploadWidget, WidgetState};
