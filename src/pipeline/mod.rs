//! Pipeline stages for contract risk analysis.
//!
//! Each submodule implements exactly one step, so each is testable on its own
//! and the two I/O seams ([`extract::TextExtractor`] and
//! [`remote::ReasoningService`]) can be replaced in tests.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ (pdf | docx) ──▶ remote ──▶ normalize
//! (dispatch)   (bytes→text)    (LLM)      (clamp, relabel)
//! ```
//!
//! 1. [`extract`]: dispatch on the document kind; trim and window the text
//! 2. [`pdf`]: text from PDF bytes; CPU-bound, runs in `spawn_blocking`
//! 3. [`docx`]: text from the OOXML `word/document.xml` part
//! 4. [`remote`]: one reasoning-service call, bounded by a timeout
//! 5. [`normalize`]: strict parsing of the reply into the result envelope

pub mod docx;
pub mod extract;
pub mod normalize;
pub mod pdf;
pub mod remote;
