use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use growth_pipeline::server::{self, AppState};
use growth_pipeline::{CampaignRequest, CampaignRunner, Config, RenderClient};

#[derive(Parser)]
#[command(name = "growth-pipeline", version, about = "Storyboard and growth-campaign service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default).
    Serve,
    /// Run the campaign pipeline once and print every task's output.
    Run {
        /// JSON object with campaign inputs (brand_name, niche, budget_level, ...).
        #[arg(long, env = "CAMPAIGN_INPUTS")]
        inputs: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "growth_pipeline=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(
                host = %config.server.host,
                port = config.server.port,
                "Loaded server configuration"
            );
            let state = AppState::from_config(&config)?;
            server::serve(state, &config.server).await?;
        }
        Command::Run { inputs } => run(&config, inputs.as_deref()).await?,
    }

    Ok(())
}

async fn run(config: &Config, inputs: Option<&str>) -> anyhow::Result<()> {
    let request = match inputs {
        Some(raw) => serde_json::from_str::<CampaignRequest>(raw)
            .context("--inputs must be a JSON object")?,
        None => CampaignRequest::sample(),
    };

    let renderer = Arc::new(RenderClient::new(&config.render)?);
    let runner: Arc<dyn CampaignRunner> =
        Arc::new(server::state::campaign_runner(config, renderer)?);

    for task in runner.run(&request.normalized()).await? {
        println!("\n=== {} ===", task.name);
        println!("{}", task.output);
    }
    Ok(())
}
