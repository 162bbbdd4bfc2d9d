//! Client for the Render MCP storyboard service.
//!
//! A storyboard job is submitted with one `POST`. The service either answers
//! with the finished job (`200`/`201`) or accepts it (`202`) and hands back a
//! status URL (or a job ID) that is polled until the job reaches a terminal
//! state. Polling is part of the provider's job protocol; failed requests are
//! never retried.

use crate::config::RenderSettings;
use crate::error::{Error, Result};
use crate::storyboard::StoryboardRequest;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

const SERVICE: &str = "Render MCP";

const DONE_STATES: [&str; 3] = ["succeeded", "completed", "ready"];
const FAILED_STATES: [&str; 2] = ["failed", "error"];

/// Anything that can turn a storyboard request into a finished job result.
#[async_trait]
pub trait StoryboardRenderer: Send + Sync {
    /// Validate, submit, and wait for a storyboard job. The provider's JSON
    /// is returned unmodified.
    async fn generate_storyboard(&self, request: &StoryboardRequest) -> Result<Value>;
}

/// HTTP client for the Render MCP service.
#[derive(Clone)]
pub struct RenderClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    poll_interval: Duration,
    max_poll_time: Duration,
}

impl std::fmt::Debug for RenderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_time", &self.max_poll_time)
            .finish()
    }
}

impl RenderClient {
    /// Build a client from settings. A missing token is not an error here;
    /// it is reported when a job is submitted.
    pub fn new(settings: &RenderSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            poll_interval: settings.poll_interval,
            max_poll_time: settings.max_poll_time,
        })
    }

    fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            Error::InvalidConfig(
                "Render MCP token not provided. Set the RENDER_MCP_TOKEN environment variable."
                    .into(),
            )
        })
    }

    fn status_url_for(&self, accepted: &Value) -> Result<String> {
        if let Some(url) = accepted.get("status_url").and_then(Value::as_str) {
            if !url.is_empty() {
                return Ok(url.to_string());
            }
        }
        let job_id = match accepted.get("job_id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(Error::Provider {
                    message: "Render MCP returned 202 but did not provide status_url or job_id"
                        .into(),
                    detail: Some(accepted.clone()),
                })
            }
        };
        Ok(format!("{}/jobs/{}", self.base_url, job_id))
    }

    async fn poll_until_complete(&self, token: &str, status_url: &str) -> Result<Value> {
        let started = Instant::now();
        loop {
            if started.elapsed() > self.max_poll_time {
                return Err(Error::Timeout("Render MCP job to complete".into()));
            }

            let resp = self.client.get(status_url).bearer_auth(token).send().await?;
            if !matches!(resp.status(), StatusCode::OK | StatusCode::ACCEPTED) {
                return Err(Error::from_response(SERVICE, resp).await);
            }

            let data = Error::read_json(SERVICE, resp).await?;
            let status = data
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_ascii_lowercase();
            tracing::debug!(%status_url, %status, "polled storyboard job");

            if DONE_STATES.contains(&status.as_str()) {
                ensure_success(&data)?;
                return Ok(data);
            }
            if FAILED_STATES.contains(&status.as_str()) {
                let message = failure_message(&data, &["error", "message"]);
                return Err(Error::Provider {
                    message,
                    detail: Some(data),
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl StoryboardRenderer for RenderClient {
    async fn generate_storyboard(&self, request: &StoryboardRequest) -> Result<Value> {
        request.validate()?;
        let token = self.token()?;
        let payload = request.to_job_payload();

        tracing::info!(
            project = %request.project_name,
            frames = request.frames.len(),
            "submitting storyboard job"
        );

        let resp = self
            .client
            .post(&self.base_url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let data = Error::read_json(SERVICE, resp).await?;
                ensure_success(&data)?;
                Ok(data)
            }
            StatusCode::ACCEPTED => {
                let accepted = Error::read_json(SERVICE, resp).await?;
                let status_url = self.status_url_for(&accepted)?;
                tracing::info!(%status_url, "storyboard job accepted, polling");
                self.poll_until_complete(token, &status_url).await
            }
            _ => Err(Error::from_response(SERVICE, resp).await),
        }
    }
}

fn ensure_success(data: &Value) -> Result<()> {
    let empty = match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        return Err(Error::provider("Empty response from Render MCP"));
    }
    let status = data.get("status").and_then(Value::as_str).unwrap_or_default();
    if FAILED_STATES.contains(&status) {
        return Err(Error::Provider {
            message: failure_message(data, &["error"]),
            detail: Some(data.clone()),
        });
    }
    Ok(())
}

fn failure_message(data: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| data.get(*k))
        .find_map(|v| match v {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| "Render MCP reported failure".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storyboard::Frame;
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> RenderSettings {
        RenderSettings::default()
            .with_url(format!("{}/mcp", server.uri()))
            .with_token("rnd_test")
            .with_polling(Duration::from_millis(10), Duration::from_millis(500))
    }

    fn request() -> StoryboardRequest {
        StoryboardRequest::new(
            "Launch teaser",
            vec![
                Frame::new("a cat").with_negative_prompt("blurry"),
                Frame::new("b dog"),
            ],
        )
    }

    #[tokio::test]
    async fn test_immediate_success_passes_result_through() {
        let server = MockServer::start().await;
        let result = json!({"status": "completed", "images": ["https://cdn/1.png"]});
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/mcp"))
            .and(matchers::header("authorization", "Bearer rnd_test"))
            .and(matchers::body_partial_json(json!({
                "action": "storyboard.generate",
                "project": "Launch teaser",
                "frames": [{"prompt": "a cat", "negative_prompt": "blurry"}, {"prompt": "b dog"}],
                "parameters": {"cfg_scale": 5.0, "steps": 28, "width": 768, "height": 1024}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(result.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = RenderClient::new(&settings(&server)).unwrap();
        let out = client.generate_storyboard(&request()).await.unwrap();
        assert_eq!(out, result);
    }

    #[tokio::test]
    async fn test_accepted_job_polls_status_url() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "status_url": format!("{}/status/abc", server.uri())
            })))
            .mount(&server)
            .await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/status/abc"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"status": "running"})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/status/abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "SUCCEEDED", "frames": 2})),
            )
            .mount(&server)
            .await;

        let client = RenderClient::new(&settings(&server)).unwrap();
        let out = client.generate_storyboard(&request()).await.unwrap();
        assert_eq!(out["frames"], 2);
    }

    #[tokio::test]
    async fn test_accepted_job_infers_status_url_from_job_id() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "job-7"})))
            .mount(&server)
            .await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/mcp/jobs/job-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ready"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RenderClient::new(&settings(&server)).unwrap();
        let out = client.generate_storyboard(&request()).await.unwrap();
        assert_eq!(out["status"], "ready");
    }

    #[tokio::test]
    async fn test_accepted_without_locator_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"queued": true})))
            .mount(&server)
            .await;

        let client = RenderClient::new(&settings(&server)).unwrap();
        let err = client.generate_storyboard(&request()).await.unwrap_err();
        assert!(err.to_string().contains("did not provide status_url or job_id"));
    }

    #[tokio::test]
    async fn test_failed_job_reports_provider_message() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "j1"})))
            .mount(&server)
            .await;
        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "failed",
                "message": "GPU quota exceeded"
            })))
            .mount(&server)
            .await;

        let client = RenderClient::new(&settings(&server)).unwrap();
        let err = client.generate_storyboard(&request()).await.unwrap_err();
        match err {
            Error::Provider { message, detail } => {
                assert_eq!(message, "GPU quota exceeded");
                assert_eq!(detail.unwrap()["status"], "failed");
            }
            other => panic!("Expected Provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_keeps_body_verbatim() {
        let server = MockServer::start().await;
        let body = json!({"error": "invalid token", "code": "unauthorized"});
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let client = RenderClient::new(&settings(&server)).unwrap();
        let err = client.generate_storyboard(&request()).await.unwrap_err();
        assert_eq!(err.detail(), Some(&body));
        assert!(err
            .to_string()
            .starts_with("Render MCP request failed with status 401"));
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_wrapped() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = RenderClient::new(&settings(&server)).unwrap();
        let err = client.generate_storyboard(&request()).await.unwrap_err();
        assert_eq!(err.detail(), Some(&json!({"body": "upstream down"})));
    }

    #[tokio::test]
    async fn test_success_status_with_html_body_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = RenderClient::new(&settings(&server)).unwrap();
        let err = client.generate_storyboard(&request()).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Provider);
        assert!(err.to_string().contains("not JSON"));
        assert_eq!(err.detail(), Some(&json!({"body": "<html>maintenance</html>"})));
    }

    #[tokio::test]
    async fn test_polling_times_out() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"job_id": "slow"})))
            .mount(&server)
            .await;
        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"status": "running"})))
            .mount(&server)
            .await;

        let settings = settings(&server)
            .with_polling(Duration::from_millis(10), Duration::from_millis(60));
        let client = RenderClient::new(&settings).unwrap();
        let err = client.generate_storyboard(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let server = MockServer::start().await;
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut settings = settings(&server);
        settings.token = None;
        let client = RenderClient::new(&settings).unwrap();
        let err = client.generate_storyboard(&request()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_provider() {
        let server = MockServer::start().await;
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = RenderClient::new(&settings(&server)).unwrap();
        let empty = StoryboardRequest::new("Empty", Vec::new());
        let err = client.generate_storyboard(&empty).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_success_body_marked_failed_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"status": "error", "error": "bad seed"})),
            )
            .mount(&server)
            .await;

        let client = RenderClient::new(&settings(&server)).unwrap();
        let err = client.generate_storyboard(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "bad seed");
    }
}
