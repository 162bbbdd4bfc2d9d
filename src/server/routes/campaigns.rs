use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{routing::post, Json, Router};

use crate::campaign::CampaignRequest;
use crate::launch::{ExecutionMode, LaunchOutcome};
use crate::server::error::{ApiError, ApiResult};
use crate::server::state::AppState;

async fn dispatch(
    state: AppState,
    mode: ExecutionMode,
    payload: Result<Json<CampaignRequest>, JsonRejection>,
) -> ApiResult<Json<LaunchOutcome>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let outcome = state.launcher.launch(mode, request).await?;
    Ok(Json(outcome))
}

/// POST /launch -- acknowledge and run the campaign in the background.
async fn launch_campaign(
    State(state): State<AppState>,
    payload: Result<Json<CampaignRequest>, JsonRejection>,
) -> ApiResult<Json<LaunchOutcome>> {
    dispatch(state, ExecutionMode::Async, payload).await
}

/// POST /launch/sync -- run the campaign and return every task's output.
async fn launch_campaign_sync(
    State(state): State<AppState>,
    payload: Result<Json<CampaignRequest>, JsonRejection>,
) -> ApiResult<Json<LaunchOutcome>> {
    dispatch(state, ExecutionMode::Sync, payload).await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/launch", post(launch_campaign))
        .route("/launch/sync", post(launch_campaign_sync))
}
