use std::sync::Arc;

use crate::config::Config;
use crate::crew::{CampaignRunner, Crew, CrewRunner};
use crate::error::Result;
use crate::exec_ctx::ExecCtx;
use crate::launch::Launcher;
use crate::render::{RenderClient, StoryboardRenderer};
use crate::tools::StoryboardTool;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<dyn StoryboardRenderer>,
    pub launcher: Launcher,
}

impl AppState {
    pub fn new(renderer: Arc<dyn StoryboardRenderer>, runner: Arc<dyn CampaignRunner>) -> Self {
        Self {
            renderer,
            launcher: Launcher::new(runner),
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let renderer: Arc<dyn StoryboardRenderer> = Arc::new(RenderClient::new(&config.render)?);
        if config.render.token.is_none() {
            tracing::warn!("RENDER_MCP_TOKEN is not set; storyboard requests will fail");
        }
        let runner = campaign_runner(config, Arc::clone(&renderer))?;
        Ok(Self::new(renderer, Arc::new(runner)))
    }
}

/// The configured crew with the storyboard tool wired to `renderer`.
pub fn campaign_runner(config: &Config, renderer: Arc<dyn StoryboardRenderer>) -> Result<CrewRunner> {
    let ctx = ExecCtx::from_settings(&config.llm)?;
    let crew = load_crew(config)?.with_tool(Arc::new(StoryboardTool::new(renderer)));
    tracing::info!(
        tasks = crew.tasks().len(),
        model = %ctx.model,
        "campaign crew ready"
    );
    Ok(CrewRunner::new(crew, ctx))
}

/// The built-in roster, or the one in `CREW_CONFIG_DIR` when set.
pub fn load_crew(config: &Config) -> Result<Crew> {
    match config.crew_config_dir {
        #[cfg(feature = "yaml")]
        Some(ref dir) => {
            tracing::info!(dir = %dir.display(), "loading crew definition");
            Crew::from_dir(dir)
        }
        #[cfg(not(feature = "yaml"))]
        Some(_) => Err(crate::error::Error::InvalidConfig(
            "CREW_CONFIG_DIR requires the `yaml` feature".into(),
        )),
        None => Ok(Crew::growth_default()),
    }
}
