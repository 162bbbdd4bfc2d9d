//! The browser form and its text-returning handlers.

use std::collections::HashMap;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Router};

use crate::campaign::CampaignRequest;
use crate::error::{Error, Result};
use crate::launch::{ExecutionMode, LaunchOutcome};
use crate::present;
use crate::server::error::status_for;
use crate::server::state::AppState;
use crate::storyboard::StoryboardForm;

const INDEX_HTML: &str = include_str!("../../../static/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

fn text_response<T: serde::Serialize>(result: Result<T>) -> (StatusCode, String) {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => status_for(e).0,
    };
    (status, present::render(&result))
}

/// POST /app/storyboards
async fn submit_storyboard(
    State(state): State<AppState>,
    form: std::result::Result<Form<StoryboardForm>, FormRejection>,
) -> (StatusCode, String) {
    let result: Result<serde_json::Value> = async {
        let Form(form) = form.map_err(|e| Error::validation(e.body_text()))?;
        let request = form.build()?;
        request.validate()?;
        state.renderer.generate_storyboard(&request).await
    }
    .await;
    text_response(result)
}

/// POST /app/launch -- `mode` picks sync or async; every other field is campaign input.
async fn submit_launch(
    State(state): State<AppState>,
    form: std::result::Result<Form<HashMap<String, String>>, FormRejection>,
) -> (StatusCode, String) {
    let result: Result<LaunchOutcome> = async {
        let Form(mut fields) = form.map_err(|e| Error::validation(e.body_text()))?;
        let mode = match fields.remove("mode") {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<ExecutionMode>()?,
            _ => ExecutionMode::default(),
        };
        state
            .launcher
            .launch(mode, CampaignRequest::from_form(fields))
            .await
    }
    .await;
    text_response(result)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/app", get(index))
        .route("/app/", get(index))
        .route("/app/storyboards", post(submit_storyboard))
        .route("/app/launch", post(submit_launch))
}
