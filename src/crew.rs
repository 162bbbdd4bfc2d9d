//! Sequential multi-agent campaign runner.
//!
//! A [`Crew`] is an ordered list of [`Task`]s, each executed by one of the
//! crew's [`Agent`]s. Tasks run one after another; every task sees the
//! campaign inputs and the outputs of all tasks before it. Agents that list
//! [tools](crate::tools) may call them before giving their answer.
//!
//! ```text
//! inputs ──► task 1 ──► task 2 ──► ... ──► task N
//!              │           │                  │
//!              ▼           ▼                  ▼
//!          TaskOutput  TaskOutput         TaskOutput
//! ```

use crate::backend::{ChatMessage, LlmRequest};
use crate::campaign::CampaignRequest;
use crate::error::{Error, Result};
use crate::exec_ctx::ExecCtx;
use crate::prompt;
use crate::tools::{Tool, ToolCall, ToolSet};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Tool calls allowed per task before the task fails.
pub const MAX_TOOL_CALLS: usize = 4;

/// A persona that executes tasks. Rendered into the system prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default)]
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Overrides the context's sampling temperature when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Names of the tools this agent may call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            temperature: None,
            tools: Vec::new(),
        }
    }

    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    fn system_prompt(&self, vars: &HashMap<String, String>) -> String {
        let persona = format!(
            "You are {}.\nYour goal: {}\n\n{}",
            self.role, self.goal, self.backstory
        );
        prompt::render(&persona, vars)
    }
}

/// One step of the campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub name: String,
    /// Prompt template; `{key}` placeholders are filled from the campaign inputs.
    pub description: String,
    pub expected_output: String,
    /// Name of the agent that runs this task.
    pub agent: String,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        agent: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent: agent.into(),
        }
    }

    fn prompt(
        &self,
        vars: &HashMap<String, String>,
        previous: &[TaskOutput],
        tools: &[Arc<dyn Tool>],
    ) -> String {
        let mut parts = vec![
            prompt::render(&self.description, vars),
            prompt::section("Expected output", &prompt::render(&self.expected_output, vars)),
        ];
        if !tools.is_empty() {
            parts.push(prompt::section("Tools", &tools_help(tools)));
        }
        if !previous.is_empty() {
            let context = previous
                .iter()
                .map(|p| format!("### {}\n{}", p.name, p.output))
                .collect::<Vec<_>>()
                .join("\n\n");
            parts.push(prompt::section("Context from earlier tasks", &context));
        }
        parts.join("\n\n")
    }
}

fn tools_help(tools: &[Arc<dyn Tool>]) -> String {
    let mut help = String::from(
        "To call a tool, reply with only a JSON object of the form \
         {\"tool\": \"<name>\", \"input\": {...}}. You will get the result and can \
         continue. Reply in plain text once you have your final answer.",
    );
    for tool in tools {
        help.push_str(&format!(
            "\n\n### {}\n{}\nExample input: {}",
            tool.name(),
            tool.description(),
            tool.input_example()
        ));
    }
    help
}

/// Final state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Completed,
}

/// Result of one task, as reported by the sync launch endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub name: String,
    pub agent: String,
    pub status: TaskStatus,
    pub output: String,
}

/// A validated, ordered set of agents and tasks.
#[derive(Debug, Clone)]
pub struct Crew {
    pub(crate) agents: Vec<Agent>,
    pub(crate) tasks: Vec<Task>,
    pub(crate) tools: ToolSet,
}

impl Crew {
    pub fn builder() -> CrewBuilder {
        CrewBuilder::default()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Register a tool that agents can call by name.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool);
        self
    }

    fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// The registered tools an agent names. Unregistered names are skipped.
    fn tools_for(&self, agent: &Agent) -> Vec<Arc<dyn Tool>> {
        agent
            .tools
            .iter()
            .filter_map(|name| {
                let tool = self.tools.get(name).cloned();
                if tool.is_none() {
                    tracing::warn!(agent = %agent.name, tool = %name, "tool not registered, agent runs without it");
                }
                tool
            })
            .collect()
    }

    /// Check names are unique and every task references a known agent.
    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(Error::InvalidConfig("crew has no tasks".into()));
        }
        let mut agents = HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(Error::InvalidConfig("agent name must not be empty".into()));
            }
            if !agents.insert(agent.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate agent '{}'",
                    agent.name
                )));
            }
        }
        let mut tasks = HashSet::new();
        for task in &self.tasks {
            if !tasks.insert(task.name.as_str()) {
                return Err(Error::InvalidConfig(format!("duplicate task '{}'", task.name)));
            }
            if !agents.contains(task.agent.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "task '{}' references unknown agent '{}'",
                    task.name, task.agent
                )));
            }
        }
        Ok(())
    }

    /// Run every task in order and collect their outputs.
    ///
    /// The first failing task aborts the run with [`Error::StageFailed`],
    /// which keeps the underlying error as its source.
    pub async fn kickoff(
        &self,
        ctx: &ExecCtx,
        vars: &HashMap<String, String>,
    ) -> Result<Vec<TaskOutput>> {
        let total = self.tasks.len();
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(total);

        for (idx, task) in self.tasks.iter().enumerate() {
            let agent = self.agent(&task.agent).ok_or_else(|| {
                Error::stage_failed(
                    &task.name,
                    Error::InvalidConfig(format!("unknown agent '{}'", task.agent)),
                )
            })?;

            tracing::info!(task = %task.name, agent = %agent.name, step = idx + 1, total, "running task");

            let tools = self.tools_for(agent);
            let mut request = LlmRequest::new(ctx.model.clone(), task.prompt(vars, &outputs, &tools));
            request.system_prompt = Some(agent.system_prompt(vars));
            request.config = ctx.config.clone();
            if let Some(temp) = agent.temperature {
                request.config.temperature = temp;
            }

            let text = converse(ctx, request, &tools)
                .await
                .map_err(|e| Error::stage_failed(&task.name, e))?;

            outputs.push(TaskOutput {
                name: task.name.clone(),
                agent: agent.name.clone(),
                status: TaskStatus::Completed,
                output: text,
            });
        }

        Ok(outputs)
    }

    /// Load a crew from `agents.yaml` and `tasks.yaml` contents.
    ///
    /// Both documents map a name to its definition; task order follows the
    /// document order.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(agents_yaml: &str, tasks_yaml: &str) -> Result<Self> {
        fn entries<T: serde::de::DeserializeOwned>(
            doc: &str,
            what: &str,
        ) -> Result<Vec<(String, T)>> {
            let mapping: serde_yaml::Mapping = serde_yaml::from_str(doc)
                .map_err(|e| Error::InvalidConfig(format!("invalid {what} YAML: {e}")))?;
            mapping
                .into_iter()
                .map(|(key, value)| {
                    let name = key
                        .as_str()
                        .ok_or_else(|| Error::InvalidConfig(format!("{what} keys must be strings")))?
                        .to_string();
                    let parsed = serde_yaml::from_value(value).map_err(|e| {
                        Error::InvalidConfig(format!("invalid {what} '{name}': {e}"))
                    })?;
                    Ok((name, parsed))
                })
                .collect()
        }

        let mut builder = Crew::builder();
        for (name, agent) in entries::<Agent>(agents_yaml, "agent")? {
            builder = builder.agent(Agent { name, ..agent });
        }
        for (name, task) in entries::<Task>(tasks_yaml, "task")? {
            builder = builder.task(Task { name, ..task });
        }
        builder.build()
    }

    /// Load `agents.yaml` and `tasks.yaml` from a directory.
    #[cfg(feature = "yaml")]
    pub fn from_dir(dir: &std::path::Path) -> Result<Self> {
        let read = |file: &str| {
            std::fs::read_to_string(dir.join(file)).map_err(|e| {
                Error::InvalidConfig(format!("cannot read {}: {e}", dir.join(file).display()))
            })
        };
        Self::from_yaml_str(&read("agents.yaml")?, &read("tasks.yaml")?)
    }
}

/// Ask the model until it gives a final answer, running the tool calls it
/// makes along the way.
async fn converse(ctx: &ExecCtx, mut request: LlmRequest, tools: &[Arc<dyn Tool>]) -> Result<String> {
    let mut calls = 0;
    loop {
        let response = ctx
            .backend
            .complete(&ctx.client, &ctx.base_url, &request)
            .await?;

        let text = response.text.trim().to_string();
        if text.is_empty() {
            return Err(Error::provider("model returned an empty response"));
        }

        let call = match ToolCall::parse(&text) {
            Some(call) if !tools.is_empty() => call,
            _ => {
                tracing::debug!(status = response.status, chars = text.len(), tool_calls = calls, "task completed");
                return Ok(text);
            }
        };
        if calls == MAX_TOOL_CALLS {
            return Err(Error::provider(format!(
                "agent made more than {MAX_TOOL_CALLS} tool calls"
            )));
        }
        calls += 1;

        let ToolCall { tool: name, input } = call;
        let result = match tools.iter().find(|t| t.name() == name) {
            Some(tool) => tool.call(input).await,
            None => Err(Error::validation(format!("Unknown tool '{name}'"))),
        };
        match &result {
            Ok(_) => tracing::info!(tool = %name, "tool call succeeded"),
            Err(e) => tracing::warn!(tool = %name, error = %e, "tool call failed"),
        }

        let prompt = std::mem::take(&mut request.prompt);
        request.messages.push(ChatMessage::user(prompt));
        request.messages.push(ChatMessage::assistant(text));
        request.prompt = format!("Result of `{name}`:\n{}", crate::tools::report(&result));
    }
}

/// Builder for [`Crew`].
#[derive(Debug, Default)]
pub struct CrewBuilder {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
    tools: ToolSet,
}

impl CrewBuilder {
    pub fn agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool);
        self
    }

    pub fn build(self) -> Result<Crew> {
        let crew = Crew {
            agents: self.agents,
            tasks: self.tasks,
            tools: self.tools,
        };
        crew.validate()?;
        Ok(crew)
    }
}

/// Anything that can execute a campaign to completion.
#[async_trait]
pub trait CampaignRunner: Send + Sync {
    async fn run(&self, request: &CampaignRequest) -> Result<Vec<TaskOutput>>;
}

/// [`CampaignRunner`] backed by a [`Crew`] and an LLM context.
#[derive(Debug, Clone)]
pub struct CrewRunner {
    crew: Arc<Crew>,
    ctx: Arc<ExecCtx>,
}

impl CrewRunner {
    pub fn new(crew: Crew, ctx: ExecCtx) -> Self {
        Self {
            crew: Arc::new(crew),
            ctx: Arc::new(ctx),
        }
    }

    pub fn crew(&self) -> &Crew {
        &self.crew
    }
}

#[async_trait]
impl CampaignRunner for CrewRunner {
    async fn run(&self, request: &CampaignRequest) -> Result<Vec<TaskOutput>> {
        self.crew.kickoff(&self.ctx, &request.template_vars()).await
    }
}
