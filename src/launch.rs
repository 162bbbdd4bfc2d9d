//! Synchronous vs. asynchronous campaign execution.
//!
//! Every submission ends in exactly one of two states: the caller waited and
//! got every task's output ([`LaunchOutcome::Completed`]), or the run was
//! handed to the runtime and only acknowledged ([`LaunchOutcome::Queued`]).
//! Queued runs cannot be observed afterwards; their result is only logged.
//! They are not awaited on shutdown: [`Launcher::in_flight`] reports how many
//! are still running so the server can log what it drops.

use crate::campaign::CampaignRequest;
use crate::crew::{CampaignRunner, TaskOutput};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// How the caller wants a campaign executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Wait for the whole pipeline.
    Sync,
    /// Acknowledge immediately and run detached.
    #[default]
    Async,
}

impl FromStr for ExecutionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(ExecutionMode::Sync),
            "async" => Ok(ExecutionMode::Async),
            other => Err(Error::validation(format!(
                "Unknown execution mode '{other}'; expected 'sync' or 'async'."
            ))),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sync => write!(f, "sync"),
            ExecutionMode::Async => write!(f, "async"),
        }
    }
}

/// Terminal state of a submission.
///
/// Serializes as `{"status":"queued"}` or
/// `{"status":"completed","result":[...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "lowercase")]
pub enum LaunchOutcome {
    Queued,
    Completed(Vec<TaskOutput>),
}

/// Dispatches campaigns to a [`CampaignRunner`] in the requested mode.
#[derive(Clone)]
pub struct Launcher {
    runner: Arc<dyn CampaignRunner>,
    in_flight: Arc<AtomicUsize>,
}

impl fmt::Debug for Launcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launcher")
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

/// Decrements the in-flight count when a queued run ends, even by panic.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Launcher {
    pub fn new(runner: Arc<dyn CampaignRunner>) -> Self {
        Self {
            runner,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queued campaigns that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn launch(&self, mode: ExecutionMode, request: CampaignRequest) -> Result<LaunchOutcome> {
        let request = request.normalized();
        match mode {
            ExecutionMode::Sync => {
                tracing::info!(fields = request.len(), "running campaign synchronously");
                let outputs = self.runner.run(&request).await?;
                Ok(LaunchOutcome::Completed(outputs))
            }
            ExecutionMode::Async => {
                tracing::info!(fields = request.len(), "queueing campaign");
                let runner = Arc::clone(&self.runner);
                let guard = InFlight::enter(&self.in_flight);
                tokio::spawn(async move {
                    let _guard = guard;
                    match runner.run(&request).await {
                        Ok(outputs) => {
                            tracing::info!(tasks = outputs.len(), "queued campaign finished")
                        }
                        Err(e) => tracing::error!(error = %e, "queued campaign failed"),
                    }
                });
                Ok(LaunchOutcome::Queued)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::{Agent, Crew, CrewRunner, Task};
    use crate::backend::MockBackend;
    use crate::exec_ctx::ExecCtx;
    use serde_json::json;
    use std::time::{Duration, Instant};

    fn launcher(delay: Duration) -> Launcher {
        let crew = Crew::builder()
            .agent(Agent::new("strategist", "Strategist", "Plan", "Experienced."))
            .task(Task::new("plan", "strategist", "Plan {brand_name}.", "A plan."))
            .build()
            .unwrap();
        let ctx = ExecCtx::builder("http://unused")
            .backend(Arc::new(MockBackend::fixed("the plan").with_delay(delay)))
            .build()
            .unwrap();
        Launcher::new(Arc::new(CrewRunner::new(crew, ctx)))
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("sync".parse::<ExecutionMode>().unwrap(), ExecutionMode::Sync);
        assert_eq!(" ASYNC ".parse::<ExecutionMode>().unwrap(), ExecutionMode::Async);
        let err = "later".parse::<ExecutionMode>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(ExecutionMode::default(), ExecutionMode::Async);
    }

    #[test]
    fn test_outcome_wire_shape() {
        assert_eq!(
            serde_json::to_value(LaunchOutcome::Queued).unwrap(),
            json!({"status": "queued"})
        );
        let done = LaunchOutcome::Completed(vec![TaskOutput {
            name: "plan".into(),
            agent: "strategist".into(),
            status: crate::crew::TaskStatus::Completed,
            output: "the plan".into(),
        }]);
        assert_eq!(
            serde_json::to_value(done).unwrap(),
            json!({
                "status": "completed",
                "result": [{"name": "plan", "agent": "strategist", "status": "completed", "output": "the plan"}]
            })
        );
    }

    #[tokio::test]
    async fn test_sync_waits_for_outputs() {
        let outcome = launcher(Duration::ZERO)
            .launch(ExecutionMode::Sync, CampaignRequest::sample())
            .await
            .unwrap();
        match outcome {
            LaunchOutcome::Completed(outputs) => {
                assert_eq!(outputs.len(), 1);
                assert_eq!(outputs[0].output, "the plan");
            }
            other => panic!("Expected Completed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_async_returns_before_sync_with_slow_provider() {
        let launcher = launcher(Duration::from_millis(300));

        let started = Instant::now();
        let queued = launcher
            .launch(ExecutionMode::Async, CampaignRequest::sample())
            .await
            .unwrap();
        let async_elapsed = started.elapsed();
        assert_eq!(queued, LaunchOutcome::Queued);

        let started = Instant::now();
        let completed = launcher
            .launch(ExecutionMode::Sync, CampaignRequest::sample())
            .await
            .unwrap();
        let sync_elapsed = started.elapsed();

        assert!(matches!(completed, LaunchOutcome::Completed(_)));
        assert!(async_elapsed < Duration::from_millis(300));
        assert!(sync_elapsed >= Duration::from_millis(300));
        assert!(async_elapsed < sync_elapsed);
    }

    #[tokio::test]
    async fn test_in_flight_tracks_queued_runs() {
        let launcher = launcher(Duration::from_millis(100));
        assert_eq!(launcher.in_flight(), 0);

        launcher
            .launch(ExecutionMode::Async, CampaignRequest::sample())
            .await
            .unwrap();
        launcher
            .launch(ExecutionMode::Async, CampaignRequest::sample())
            .await
            .unwrap();
        assert_eq!(launcher.in_flight(), 2);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(launcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_sync_runs_are_not_counted() {
        let launcher = launcher(Duration::ZERO);
        launcher
            .launch(ExecutionMode::Sync, CampaignRequest::sample())
            .await
            .unwrap();
        assert_eq!(launcher.in_flight(), 0);
    }
}
