//! Configuration for the analysis pipeline.
//!
//! Every knob lives in [`AnalyzerConfig`], built through
//! [`AnalyzerConfigBuilder`]. Setters clamp to sane ranges; [`build`] rejects
//! combinations that can never work.
//!
//! [`build`]: AnalyzerConfigBuilder::build

use crate::error::AnalysisError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Provider used when none is named.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Model used when none is named.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Configuration for contract analysis.
///
/// # Example
/// ```rust
/// use contract_risk::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .model("gpt-4.1")
///     .max_chars(20_000)
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_chars, 20_000);
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// LLM model identifier. If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None, uses [`DEFAULT_PROVIDER`].
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`
    /// and skips the credential check.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Environment variable that must hold the provider credential.
    /// If None, derived from the provider name (`OPENAI_API_KEY` for openai).
    pub credential_env: Option<String>,

    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 1024.
    pub max_tokens: usize,

    /// Character window sent to the model; extracted text beyond it is
    /// dropped. Default: 15 000.
    pub max_chars: usize,

    /// Timeout for one reasoning-service call in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Custom system instruction. If None, uses the built-in one.
    pub system_prompt: Option<String>,

    /// Replace upstream error text with a generic message in client
    /// responses. Default: false.
    pub redact_upstream_errors: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            credential_env: None,
            temperature: 0.2,
            max_tokens: 1024,
            max_chars: 15_000,
            api_timeout_secs: 60,
            system_prompt: None,
            redact_upstream_errors: false,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("credential_env", &self.credential_env)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_chars", &self.max_chars)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("redact_upstream_errors", &self.redact_upstream_errors)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Provider name with the default applied.
    pub fn provider_name(&self) -> &str {
        self.provider_name.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    /// Model with the default applied.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Name of the environment variable holding the credential, or None for
    /// providers that run without one (local servers).
    pub fn credential_env(&self) -> Option<String> {
        if let Some(ref name) = self.credential_env {
            return Some(name.clone());
        }
        default_credential_env(self.provider_name()).map(str::to_string)
    }
}

/// API-key variable for the providers edgequake-llm knows about.
fn default_credential_env(provider: &str) -> Option<&'static str> {
    match provider.to_ascii_lowercase().as_str() {
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "gemini" => Some("GEMINI_API_KEY"),
        "mistral" => Some("MISTRAL_API_KEY"),
        "azure" => Some("AZURE_OPENAI_API_KEY"),
        "openrouter" => Some("OPENROUTER_API_KEY"),
        "ollama" | "lmstudio" => None,
        _ => Some("OPENAI_API_KEY"),
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn credential_env(mut self, name: impl Into<String>) -> Self {
        self.config.credential_env = Some(name.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_chars(mut self, n: usize) -> Self {
        self.config.max_chars = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn redact_upstream_errors(mut self, v: bool) -> Self {
        self.config.redact_upstream_errors = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalysisError> {
        let c = &self.config;
        if c.max_chars == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_chars must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(AnalysisError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
