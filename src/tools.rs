//! Tools that campaign agents can call mid-task.
//!
//! An agent that lists a tool by name sees it described in its task prompt.
//! To use it, the model replies with nothing but a JSON object:
//!
//! ```text
//! {"tool": "storyboard_generator", "input": {"prompts": ["..."]}}
//! ```
//!
//! The crew runs the tool, sends back `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}` and lets the model continue. Tool
//! failures are reported to the model, not raised.

use crate::error::{Error, Result};
use crate::normalize::merge_frames;
use crate::render::StoryboardRenderer;
use crate::storyboard::{
    default_cfg_scale, default_height, default_scheduler, default_steps, default_width,
    StoryboardRequest,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name under which [`StoryboardTool`] is registered.
pub const STORYBOARD_TOOL: &str = "storyboard_generator";

/// Something an agent can invoke with a JSON input.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// One or two sentences shown to the model.
    fn description(&self) -> &str;

    /// A representative input, shown to the model as the call format.
    fn input_example(&self) -> Value;

    async fn call(&self, input: Value) -> Result<Value>;
}

/// Tools available to a crew, keyed by name.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.tools.keys()).finish()
    }
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn insert(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.insert(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A tool invocation parsed from model output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub input: Value,
}

impl ToolCall {
    /// Parse a reply that consists only of a tool-call object, optionally
    /// inside a fenced code block. Anything else is a final answer.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let body = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|rest| rest.trim_end().strip_suffix("```"))
            .unwrap_or(trimmed)
            .trim();
        if !body.starts_with('{') {
            return None;
        }
        serde_json::from_str(body).ok()
    }
}

/// The JSON sent back to the model after a tool call.
pub fn report(result: &Result<Value>) -> Value {
    match result {
        Ok(data) => json!({"success": true, "data": data}),
        Err(e) => json!({"success": false, "error": e.to_string()}),
    }
}

/// Arguments accepted by [`StoryboardTool`].
///
/// Negative prompts line up with prompts by position, as in the web form.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryboardToolInput {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub reference_images: Vec<String>,
    pub prompts: Vec<String>,
    #[serde(default)]
    pub negative_prompts: Vec<String>,
    #[serde(default = "default_cfg_scale")]
    pub cfg_scale: f64,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_scheduler")]
    pub scheduler: String,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub extras: Map<String, Value>,
}

impl StoryboardToolInput {
    /// Build a validated storyboard request. Blank prompts are dropped.
    pub fn into_request(self) -> Result<StoryboardRequest> {
        let prompts: Vec<String> = self
            .prompts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        let negatives: Vec<String> = self
            .negative_prompts
            .iter()
            .map(|n| n.trim().to_string())
            .collect();

        let project_name = match self.project_name.trim() {
            "" => "Campaign storyboard",
            name => name,
        };
        let mut request = StoryboardRequest::new(project_name, merge_frames(prompts, &negatives))
            .with_reference_images(self.reference_images);
        request.cfg_scale = self.cfg_scale;
        request.steps = self.steps;
        request.width = self.width;
        request.height = self.height;
        request.scheduler = self.scheduler;
        request.seed = self.seed;
        request.extras = self.extras;

        request.validate()?;
        Ok(request)
    }
}

/// Renders storyboards through a [`StoryboardRenderer`] on an agent's behalf.
#[derive(Clone)]
pub struct StoryboardTool {
    renderer: Arc<dyn StoryboardRenderer>,
}

impl StoryboardTool {
    pub fn new(renderer: Arc<dyn StoryboardRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl Tool for StoryboardTool {
    fn name(&self) -> &str {
        STORYBOARD_TOOL
    }

    fn description(&self) -> &str {
        "Render a multi-frame storyboard with the cloud image model. Up to 12 \
         frames per call; reference image URLs keep characters consistent."
    }

    fn input_example(&self) -> Value {
        json!({
            "project_name": "Launch teaser",
            "reference_images": ["https://cdn.example.com/hero.png"],
            "prompts": ["wide shot of the product on a desk", "close-up of the logo"],
            "negative_prompts": ["blurry"],
            "cfg_scale": 5.0,
            "steps": 28
        })
    }

    async fn call(&self, input: Value) -> Result<Value> {
        let input: StoryboardToolInput = serde_json::from_value(input)
            .map_err(|e| Error::validation(format!("Invalid {STORYBOARD_TOOL} input: {e}")))?;
        let request = input.into_request()?;
        tracing::info!(frames = request.frames.len(), "agent requested storyboard");
        self.renderer.generate_storyboard(&request).await
    }
}
