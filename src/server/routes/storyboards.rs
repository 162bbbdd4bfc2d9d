use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{routing::post, Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::server::error::{ApiError, ApiResult};
use crate::server::state::AppState;
use crate::storyboard::StoryboardRequest;

#[derive(Debug, Serialize)]
pub struct StoryboardResponse {
    pub status: &'static str,
    pub result: Value,
}

/// POST /storyboards -- validate, render, and pass the provider's job result through.
async fn generate_storyboard(
    State(state): State<AppState>,
    payload: Result<Json<StoryboardRequest>, JsonRejection>,
) -> ApiResult<Json<StoryboardResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    request.validate()?;
    let result = state.renderer.generate_storyboard(&request).await?;
    Ok(Json(StoryboardResponse {
        status: "success",
        result,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/storyboards", post(generate_storyboard))
}
