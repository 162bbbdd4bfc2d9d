//! Plain-text rendering of results for the web form.
//!
//! Results are shown as pretty-printed JSON and errors as their message.
//! Nothing is interpreted or summarized.

use crate::error::{Error, Result};
use serde::Serialize;

/// Pretty-print any serializable value.
pub fn render_value<T: Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(text) => text,
        Err(e) => render_error(&Error::Json(e)),
    }
}

/// The error's message, followed by the provider's body when there is one.
pub fn render_error(err: &Error) -> String {
    match err.detail() {
        Some(detail) if !matches!(err.root(), Error::Http { .. }) => {
            format!("{}\n\n{}", err, render_value(detail))
        }
        // Http errors already carry the body in their message.
        _ => err.to_string(),
    }
}

pub fn render<T: Serialize>(result: &Result<T>) -> String {
    match result {
        Ok(value) => render_value(value),
        Err(e) => render_error(e),
    }
}
