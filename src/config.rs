//! Environment configuration.
//!
//! Everything the service needs from the outside world is read once at
//! startup into a [`Config`] and passed explicitly to the components that
//! issue requests. Nothing reads the environment after that.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_RENDER_URL: &str = "https://mcp.render.com/mcp";

/// Top-level service configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmSettings,
    pub render: RenderSettings,
    /// Directory holding `agents.yaml` / `tasks.yaml` to replace the built-in
    /// campaign roster (requires the `yaml` feature).
    pub crew_config_dir: Option<PathBuf>,
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins. `*` allows any origin.
    pub cors_origins: Vec<String>,
}

/// LLM provider settings.
#[derive(Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub organization: Option<String>,
    /// Per-call HTTP timeout.
    pub timeout: Duration,
}

/// Render provider settings.
#[derive(Clone)]
pub struct RenderSettings {
    pub url: String,
    pub token: Option<String>,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Delay between job status polls.
    pub poll_interval: Duration,
    /// Give up polling after this long.
    pub max_poll_time: Duration,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl std::fmt::Debug for RenderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSettings")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_time", &self.max_poll_time)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            cors_origins: vec!["*".into()],
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_LLM_MODEL.into(),
            base_url: DEFAULT_LLM_BASE_URL.into(),
            organization: None,
            timeout: Duration::from_secs(120),
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_RENDER_URL.into(),
            token: None,
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(5),
            max_poll_time: Duration::from_secs(300),
        }
    }
}

impl RenderSettings {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_polling(mut self, interval: Duration, max: Duration) -> Self {
        self.poll_interval = interval;
        self.max_poll_time = max;
        self
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                     | Default                      |
    /// |-----------------------------|------------------------------|
    /// | `HOST`                      | `0.0.0.0`                    |
    /// | `PORT`                      | `8000`                       |
    /// | `CORS_ORIGINS`              | `*`                          |
    /// | `OPENAI_API_KEY`            | unset                        |
    /// | `OPENAI_MODEL_NAME`         | `gpt-4o-mini`                |
    /// | `OPENAI_API_BASE`           | `https://api.openai.com`     |
    /// | `OPENAI_ORGANIZATION`       | unset                        |
    /// | `LLM_TIMEOUT_SECS`          | `120`                        |
    /// | `RENDER_MCP_TOKEN`          | unset                        |
    /// | `RENDER_MCP_URL`            | `https://mcp.render.com/mcp` |
    /// | `RENDER_TIMEOUT_SECS`       | `60`                         |
    /// | `RENDER_POLL_INTERVAL_SECS` | `5`                          |
    /// | `RENDER_MAX_POLL_SECS`      | `300`                        |
    /// | `CREW_CONFIG_DIR`           | unset                        |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            host: get("HOST").unwrap_or(server_defaults.host),
            port: parse_or("PORT", get("PORT"), server_defaults.port)?,
            cors_origins: get("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(server_defaults.cors_origins),
        };

        let llm_defaults = LlmSettings::default();
        let llm = LlmSettings {
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL_NAME").unwrap_or(llm_defaults.model),
            base_url: get("OPENAI_API_BASE").unwrap_or(llm_defaults.base_url),
            organization: get("OPENAI_ORGANIZATION"),
            timeout: secs_or("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"), llm_defaults.timeout)?,
        };

        let render_defaults = RenderSettings::default();
        let render = RenderSettings {
            url: get("RENDER_MCP_URL").unwrap_or(render_defaults.url),
            token: get("RENDER_MCP_TOKEN"),
            timeout: secs_or(
                "RENDER_TIMEOUT_SECS",
                get("RENDER_TIMEOUT_SECS"),
                render_defaults.timeout,
            )?,
            poll_interval: secs_or(
                "RENDER_POLL_INTERVAL_SECS",
                get("RENDER_POLL_INTERVAL_SECS"),
                render_defaults.poll_interval,
            )?,
            max_poll_time: secs_or(
                "RENDER_MAX_POLL_SECS",
                get("RENDER_MAX_POLL_SECS"),
                render_defaults.max_poll_time,
            )?,
        };

        Ok(Self {
            server,
            llm,
            render,
            crew_config_dir: get("CREW_CONFIG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("{} must be a number, got '{}'", key, raw))),
    }
}

fn secs_or(key: &str, raw: Option<String>, default: Duration) -> Result<Duration> {
    parse_or(key, raw, default.as_secs()).map(Duration::from_secs)
}
