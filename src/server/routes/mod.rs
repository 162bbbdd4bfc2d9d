pub mod app;
pub mod campaigns;
pub mod health;
pub mod storyboards;

use axum::Router;

use crate::server::state::AppState;

/// JSON API routes, mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(storyboards::router())
        .merge(campaigns::router())
}
