//! The reasoning-service call.
//!
//! This module is thin: prompt wording lives in
//! [`crate::prompts`] and reply parsing in [`crate::pipeline::normalize`].
//! What remains is message layout, the timeout, and error mapping.
//!
//! There is no retry loop. A transient upstream failure surfaces to the
//! user immediately as an error they can retry themselves.

use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, RemoteServiceError};
use crate::pipeline::extract::ExtractedText;
use crate::prompts::{user_payload, DEFAULT_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Everything the reasoning service needs for one document.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub text: ExtractedText,
    pub skip_gatekeeper: bool,
}

/// An external service that reads contract text and answers with the JSON
/// shape described in [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
///
/// Returns the raw reply text; validation happens in
/// [`crate::pipeline::normalize`].
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn assess(&self, request: &AnalysisRequest) -> Result<String, RemoteServiceError>;
}

/// [`ReasoningService`] backed by an edgequake-llm provider.
pub struct LlmReasoningService {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    options: CompletionOptions,
    timeout_secs: u64,
}

impl LlmReasoningService {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &AnalyzerConfig) -> Self {
        Self {
            provider,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            options: build_options(config),
            timeout_secs: config.api_timeout_secs,
        }
    }

    /// Resolve a provider from the config and wrap it.
    ///
    /// 1. **Pre-built provider** (`config.provider`): used as-is, no
    ///    credential check, which is what tests and embedders want.
    /// 2. **Named provider**: the provider's credential variable must be
    ///    set and non-empty, then
    ///    [`ProviderFactory::create_llm_provider`] builds the client.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        if let Some(ref provider) = config.provider {
            return Ok(Self::new(Arc::clone(provider), config));
        }

        let provider_name = config.provider_name();
        if let Some(var) = config.credential_env() {
            let present = std::env::var(&var).map(|v| !v.trim().is_empty()).unwrap_or(false);
            if !present {
                return Err(AnalysisError::NotConfigured {
                    hint: format!("Set {var} to enable the '{provider_name}' provider."),
                });
            }
        }

        let provider = ProviderFactory::create_llm_provider(provider_name, config.model())
            .map_err(|e| AnalysisError::NotConfigured {
                hint: format!("Provider '{provider_name}' could not be created: {e}"),
            })?;
        info!(
            "Reasoning service ready: provider={}, model={}",
            provider_name,
            config.model()
        );
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl ReasoningService for LlmReasoningService {
    async fn assess(&self, request: &AnalysisRequest) -> Result<String, RemoteServiceError> {
        let start = Instant::now();
        let payload = user_payload(request.text.as_str(), request.skip_gatekeeper);
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(payload.as_str()),
        ];

        let call = self.provider.chat(&messages, Some(&self.options));
        match timeout(Duration::from_secs(self.timeout_secs), call).await {
            Ok(Ok(response)) => {
                debug!(
                    "Reasoning call: {} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                Ok(response.content)
            }
            Ok(Err(e)) => {
                warn!("Reasoning call failed after {:?}: {}", start.elapsed(), e);
                Err(RemoteServiceError::Request(e.to_string()))
            }
            Err(_) => {
                warn!("Reasoning call timed out after {}s", self.timeout_secs);
                Err(RemoteServiceError::Timeout {
                    secs: self.timeout_secs,
                })
            }
        }
    }
}

/// Build `CompletionOptions` from the analyzer config.
fn build_options(config: &AnalyzerConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
