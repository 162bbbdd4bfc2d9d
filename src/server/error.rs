use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::{Error, ErrorKind};

/// Error type for HTTP handlers.
///
/// Produces `{"error": ..., "code": ...}` bodies, plus `"detail"` holding the
/// provider's response when one exists.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    /// The request body could not be decoded.
    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP status and machine-readable code for a crate error.
pub fn status_for(err: &Error) -> (StatusCode, &'static str) {
    match (err, err.kind()) {
        (_, ErrorKind::Validation) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        (Error::InvalidConfig(_), _) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        (Error::Timeout(_), _) => (StatusCode::BAD_GATEWAY, "UPSTREAM_TIMEOUT"),
        (_, ErrorKind::Transport) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
        (_, ErrorKind::Provider) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
        (_, ErrorKind::Internal) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match &self {
            ApiError::Core(err) => {
                let (status, code) = status_for(err);
                let message = match err {
                    Error::Json(_) | Error::Other(_) => {
                        tracing::error!(error = %err, "Internal error");
                        "An internal error occurred".to_string()
                    }
                    _ => {
                        if status.is_server_error() {
                            tracing::warn!(error = %err, code, "Request failed");
                        }
                        err.to_string()
                    }
                };
                (status, code, message, err.detail().cloned())
            }
            ApiError::BadRequest(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(detail) = detail {
            body["detail"] = detail;
        }

        (status, axum::Json(body)).into_response()
    }
}
