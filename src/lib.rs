//! # Growth Pipeline
//!
//! Storyboard rendering and growth-campaign orchestration behind a small
//! HTTP API and a browser form.
//!
//! The crate's own logic is request assembly and dispatch:
//!
//! - **[`normalize`]** turns free-text form fields into ordered lists and
//!   zips prompts with negative prompts into [`Frame`]s.
//! - **[`storyboard`]** builds and validates a [`StoryboardRequest`] and its
//!   wire payload.
//! - **[`render`]** submits storyboard jobs to the render service and waits
//!   for them ([`RenderClient`]).
//! - **[`crew`]** runs a campaign as a sequence of LLM tasks, each executed
//!   by an agent persona, through a [`Backend`](backend::Backend).
//! - **[`tools`]** lets agents render storyboards mid-task.
//! - **[`launch`]** runs a campaign either synchronously or detached
//!   ([`ExecutionMode`]).
//! - **[`present`]** renders results and errors as plain text.
//! - **[`server`]** exposes all of the above over axum.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use growth_pipeline::{CampaignRequest, Config, Crew, CrewRunner, ExecCtx, ExecutionMode, Launcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let ctx = ExecCtx::from_settings(&config.llm)?;
//!     let launcher = Launcher::new(Arc::new(CrewRunner::new(Crew::growth_default(), ctx)));
//!
//!     let outcome = launcher
//!         .launch(ExecutionMode::Sync, CampaignRequest::sample())
//!         .await?;
//!     println!("{}", growth_pipeline::present::render_value(&outcome));
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod campaign;
pub mod client;
pub mod config;
pub mod crew;
pub mod error;
pub mod exec_ctx;
pub mod launch;
pub mod normalize;
pub mod present;
pub mod prompt;
pub mod render;
mod roster;
pub mod server;
pub mod storyboard;
pub mod tools;

pub use backend::{MockBackend, OpenAiBackend};
pub use campaign::CampaignRequest;
pub use client::LlmConfig;
pub use config::Config;
pub use crew::{Agent, CampaignRunner, Crew, CrewRunner, Task, TaskOutput, TaskStatus};
pub use error::{Error, ErrorKind, Result};
pub use exec_ctx::{ExecCtx, ExecCtxBuilder};
pub use launch::{ExecutionMode, LaunchOutcome, Launcher};
pub use render::{RenderClient, StoryboardRenderer};
pub use storyboard::{Frame, StoryboardForm, StoryboardRequest};
pub use tools::{StoryboardTool, Tool, ToolSet};
