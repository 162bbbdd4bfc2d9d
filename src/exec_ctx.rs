//! Execution context shared across campaign task invocations.
//!
//! [`ExecCtx`] carries the HTTP client, LLM backend, endpoint, model and
//! sampling configuration. It is constructed once at startup and shared
//! (behind an `Arc`) by every campaign run.

use crate::backend::{Backend, OpenAiBackend};
use crate::client::LlmConfig;
use crate::config::{LlmSettings, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL};
use crate::error::{Error, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Shared execution context for LLM calls.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use growth_pipeline::backend::MockBackend;
/// use growth_pipeline::ExecCtx;
///
/// let ctx = ExecCtx::builder("https://api.openai.com/v1")
///     .backend(Arc::new(MockBackend::fixed("ok")))
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// assert_eq!(ctx.base_url, "https://api.openai.com");
/// ```
pub struct ExecCtx {
    /// HTTP client (cheap to clone, uses `Arc` internally).
    pub client: Client,
    /// Base URL for the LLM provider, without any `/v1` suffix.
    pub base_url: String,
    /// LLM backend. Default: [`OpenAiBackend`] without a key.
    pub backend: Arc<dyn Backend>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Default sampling configuration. Agents may override the temperature.
    pub config: LlmConfig,
}

impl ExecCtx {
    /// Create a new builder.
    pub fn builder(base_url: impl Into<String>) -> ExecCtxBuilder {
        ExecCtxBuilder {
            client: None,
            base_url: base_url.into(),
            backend: None,
            model: None,
            config: None,
            timeout: None,
        }
    }

    /// Build the production context from environment settings.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let mut backend = OpenAiBackend::new();
        match settings.api_key {
            Some(ref key) => backend = backend.with_api_key(key.clone()),
            None => tracing::warn!("OPENAI_API_KEY is not set; LLM calls will be unauthenticated"),
        }
        if let Some(ref org) = settings.organization {
            backend = backend.with_organization(org.clone());
        }

        ExecCtx::builder(settings.base_url.clone())
            .backend(Arc::new(backend))
            .model(settings.model.clone())
            .timeout(settings.timeout)
            .build()
    }
}

impl std::fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecCtx")
            .field("base_url", &self.base_url)
            .field("backend", &self.backend.name())
            .field("model", &self.model)
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`ExecCtx`].
pub struct ExecCtxBuilder {
    client: Option<Client>,
    base_url: String,
    backend: Option<Arc<dyn Backend>>,
    model: Option<String>,
    config: Option<LlmConfig>,
    timeout: Option<Duration>,
}

impl ExecCtxBuilder {
    /// Set the HTTP client. If not set, a default client is created.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the LLM backend.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the model. Default: `gpt-4o-mini`.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the default sampling configuration.
    pub fn config(mut self, config: LlmConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the request timeout. Default: 120 seconds.
    ///
    /// Ignored when a custom `Client` is provided via `.client()`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the execution context.
    pub fn build(self) -> Result<ExecCtx> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout.unwrap_or(Duration::from_secs(120)))
                .build()
                .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))?,
        };
        let base_url = if self.base_url.trim().is_empty() {
            DEFAULT_LLM_BASE_URL.to_string()
        } else {
            normalize_base_url(&self.base_url)
        };
        Ok(ExecCtx {
            client,
            base_url,
            backend: self
                .backend
                .unwrap_or_else(|| Arc::new(OpenAiBackend::new())),
            model: self.model.unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            config: self.config.unwrap_or_default(),
        })
    }
}

/// Strip known provider path suffixes from a base URL so the backend can
/// append its own path without doubling it.
///
/// e.g. `"https://api.openai.com/v1"` -> `"https://api.openai.com"`
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    // longest first
    for suffix in ["/v1/chat/completions", "/v1/chat", "/v1"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}
