use serde_json::{json, Value};
use thiserror::Error;

/// Errors produced while normalizing, validating, and dispatching jobs.
#[derive(Error, Debug)]
pub enum Error {
    /// Local input was malformed or incomplete. Raised before any network call.
    #[error("{0}")]
    Validation(String),

    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A remote service answered with a non-success status code.
    ///
    /// `body` holds the provider's response verbatim: the parsed JSON when the
    /// body was JSON, otherwise `{"body": "<text>"}`.
    #[error("{service} request failed with status {status}: {body}")]
    Http {
        /// Which collaborator failed (e.g. `"Render MCP"`, `"LLM"`).
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: Value,
    },

    /// A well-formed response that reports failure (e.g. a render job marked `failed`).
    #[error("{message}")]
    Provider {
        message: String,
        detail: Option<Value>,
    },

    /// A remote job did not reach a terminal state in time.
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// A campaign task failed. `source` is the underlying error, so a
    /// provider's body survives through [`Error::detail`].
    #[error("Task '{stage}' failed: {source}")]
    StageFailed { stage: String, source: Box<Error> },

    /// Invalid or missing configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

/// Coarse classification used by the HTTP layer and the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally, nothing was sent.
    Validation,
    /// Network failure or non-success response. The provider's error body,
    /// if any, is still available through [`Error::detail`].
    Transport,
    /// The provider answered successfully but reported a failed job.
    Provider,
    /// Misconfiguration or a bug on our side.
    Internal,
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Shorthand for a [`Error::Provider`] without a detail body.
    pub fn provider(message: impl Into<String>) -> Self {
        Error::Provider {
            message: message.into(),
            detail: None,
        }
    }

    /// Wrap `source` as the failure of campaign task `stage`.
    pub fn stage_failed(stage: impl Into<String>, source: Error) -> Self {
        Error::StageFailed {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through task failures.
    pub fn root(&self) -> &Error {
        match self {
            Error::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Request(_) | Error::Http { .. } | Error::Timeout(_) => ErrorKind::Transport,
            Error::Provider { .. } | Error::StageFailed { .. } => ErrorKind::Provider,
            Error::Json(_) | Error::InvalidConfig(_) | Error::Other(_) => ErrorKind::Internal,
        }
    }

    /// Build an [`Error::Http`] from a non-success response, keeping its body.
    pub(crate) async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "body": text }));
        Error::Http {
            service,
            status,
            body,
        }
    }

    /// Read a success response as JSON. A body that is not JSON is the
    /// provider's fault and becomes an [`Error::Provider`] carrying the text.
    pub(crate) async fn read_json(service: &'static str, response: reqwest::Response) -> Result<Value> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| Error::Provider {
            message: format!("{service} returned a response that is not JSON: {e}"),
            detail: Some(json!({ "body": text })),
        })
    }

    /// The provider's verbatim error body, if there is one.
    pub fn detail(&self) -> Option<&Value> {
        match self {
            Error::Http { body, .. } => Some(body),
            Error::Provider { detail, .. } => detail.as_ref(),
            Error::StageFailed { source, .. } => source.detail(),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
