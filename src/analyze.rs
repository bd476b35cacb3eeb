//! Request orchestration: preconditions, extraction, reasoning, normalisation.
//!
//! [`Analyzer`] is the whole endpoint minus HTTP. It is cheap to share behind
//! an `Arc`; the only state it keeps across requests is the lazily created
//! reasoning-service handle, which is read-only once built.

use crate::config::AnalyzerConfig;
use crate::document::{DocumentKind, RawUpload, UploadRequest, UploadedDocument};
use crate::error::AnalysisError;
use crate::pipeline::extract::{ExtractedText, FormatExtractor, TextExtractor};
use crate::pipeline::normalize::normalize_reply;
use crate::pipeline::remote::{AnalysisRequest, LlmReasoningService, ReasoningService};
use crate::result::AnalysisResult;
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Stateless contract analysis pipeline.
pub struct Analyzer {
    config: AnalyzerConfig,
    extractor: Arc<dyn TextExtractor>,
    service: OnceCell<Arc<dyn ReasoningService>>,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("service_ready", &self.service.get().is_some())
            .finish()
    }
}

impl Analyzer {
    /// Create an analyzer that resolves its reasoning service on first use.
    ///
    /// A missing credential does not fail here; every request fails with
    /// [`AnalysisError::NotConfigured`] until the service can be built.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            extractor: Arc::new(FormatExtractor),
            service: OnceCell::new(),
        }
    }

    /// Create an analyzer around an already-built reasoning service.
    pub fn with_service(config: AnalyzerConfig, service: Arc<dyn ReasoningService>) -> Self {
        let analyzer = Self::new(config);
        let _ = analyzer.service.set(service);
        analyzer
    }

    /// Replace the text extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// The reasoning-service handle, built once per process.
    ///
    /// Failures are not cached: a credential added later is picked up on the
    /// next request.
    pub fn service(&self) -> Result<&Arc<dyn ReasoningService>, AnalysisError> {
        self.service.get_or_try_init(|| {
            LlmReasoningService::from_config(&self.config)
                .map(|s| Arc::new(s) as Arc<dyn ReasoningService>)
                .map_err(|e| {
                    if let AnalysisError::NotConfigured { ref hint } = e {
                        warn!("Reasoning service unavailable: {}", hint);
                    }
                    e
                })
        })
    }

    /// Run one request through the full pipeline.
    ///
    /// Preconditions are checked in a fixed order, each short-circuiting:
    /// service configured → file present → media type accepted. Extraction
    /// and the remote call only happen after all three pass.
    pub async fn analyze(&self, request: UploadRequest) -> Result<AnalysisResult, AnalysisError> {
        let total_start = Instant::now();

        // ── Step 1: Preconditions ────────────────────────────────────────────
        let service = Arc::clone(self.service()?);
        let upload = request.file.ok_or(AnalysisError::MissingFile)?;
        let document = UploadedDocument::from_upload(upload)?;
        info!(
            "Analysing {} '{}': {} bytes, skip_gatekeeper={}",
            document.kind(),
            document.display_name(),
            document.size(),
            request.skip_gatekeeper
        );

        // ── Step 2: Extract text ─────────────────────────────────────────────
        let extract_start = Instant::now();
        let raw = self.extract(document).await?;
        let text = ExtractedText::new(&raw, self.config.max_chars)?;
        debug!(
            "Extracted {} chars in {}ms{}",
            text.original_chars(),
            extract_start.elapsed().as_millis(),
            if text.is_truncated() {
                format!(" (truncated to {})", self.config.max_chars)
            } else {
                String::new()
            }
        );

        // ── Step 3: Reasoning service ────────────────────────────────────────
        let skip_gatekeeper = request.skip_gatekeeper;
        let reply = service
            .assess(&AnalysisRequest {
                text,
                skip_gatekeeper,
            })
            .await?;

        // ── Step 4: Normalise ────────────────────────────────────────────────
        let result = normalize_reply(&reply, skip_gatekeeper)?;
        info!(
            "Analysis complete: is_contract={}, risk_score={}, {} risks, {}ms",
            result.is_contract,
            result.risk_score,
            result.key_risks.len(),
            total_start.elapsed().as_millis()
        );
        Ok(result)
    }

    /// Analyse a local file; the format is inferred from its extension.
    pub async fn analyze_file(
        &self,
        path: impl AsRef<Path>,
        skip_gatekeeper: bool,
    ) -> Result<AnalysisResult, AnalysisError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = DocumentKind::from_extension(&file_name).map(|k| k.media_type().to_string());
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AnalysisError::InvalidUpload(format!("cannot read '{}': {e}", path.display()))
        })?;

        self.analyze(UploadRequest {
            file: Some(RawUpload {
                bytes,
                media_type,
                file_name: Some(file_name),
            }),
            skip_gatekeeper,
        })
        .await
    }

    /// Run the extractor off the async executor.
    async fn extract(&self, document: UploadedDocument) -> Result<String, AnalysisError> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract(&document))
            .await
            .map_err(|e| AnalysisError::Internal(format!("Extraction task failed: {}", e)))?
            .map_err(AnalysisError::from)
    }
}
