#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use growth_pipeline::config::ServerConfig;
use growth_pipeline::crew::TaskStatus;
use growth_pipeline::server::{self, AppState};
use growth_pipeline::{
    CampaignRequest, CampaignRunner, Error, Result, StoryboardRenderer, StoryboardRequest,
    TaskOutput,
};

/// Renderer that records what it saw and answers with a fixed result or
/// error. It does no validation of its own.
#[derive(Default)]
pub struct StubRenderer {
    pub seen: Mutex<Vec<StoryboardRequest>>,
    pub fail_with: Option<(u16, Value)>,
}

#[async_trait]
impl StoryboardRenderer for StubRenderer {
    async fn generate_storyboard(&self, request: &StoryboardRequest) -> Result<Value> {
        self.seen.lock().unwrap().push(request.clone());
        if let Some((status, body)) = &self.fail_with {
            return Err(Error::Http {
                service: "Render MCP",
                status: *status,
                body: body.clone(),
            });
        }
        Ok(json!({"status": "completed", "frames": request.frames.len()}))
    }
}

/// Runner that sleeps, then echoes the brand name back as one task output.
#[derive(Default)]
pub struct StubRunner {
    pub delay: Duration,
    pub seen: Mutex<Vec<CampaignRequest>>,
}

#[async_trait]
impl CampaignRunner for StubRunner {
    async fn run(&self, request: &CampaignRequest) -> Result<Vec<TaskOutput>> {
        self.seen.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;
        let brand = request
            .get("brand_name")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        Ok(vec![TaskOutput {
            name: "plan".into(),
            agent: "strategist".into(),
            status: TaskStatus::Completed,
            output: format!("plan for {brand}"),
        }])
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
    }
}

pub fn build_test_app(renderer: Arc<StubRenderer>, runner: Arc<StubRunner>) -> Router {
    let state = AppState::new(renderer, runner);
    server::router(state, &test_config()).unwrap()
}

pub fn default_app() -> Router {
    build_test_app(Arc::default(), Arc::default())
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_form(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}
