use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use calbot::agent::gemini::GeminiAgent;
use calbot::agent::history::FileHistoryStore;
use calbot::agent::Agent;
use calbot::calendar::google::GoogleCalendar;
use calbot::calendar::memory::InMemoryCalendar;
use calbot::calendar::CalendarService;
use calbot::chat::Orchestrator;
use calbot::config::AppConfig;
use calbot::server::{self, AppState};
use calbot::{cli, config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = cli::Cli::parse();
    let config = config::load_config(&cli)?;
    tracing::info!(model = %config.model, "Config loaded");

    let orchestrator = Arc::new(Orchestrator::new(
        build_agent(&config)?,
        build_calendar(&config)?,
    ));

    match cli.command {
        cli::Commands::Serve { .. } => {
            server::serve(AppState::new(orchestrator), config.port).await?;
        }
        cli::Commands::Ask { text, .. } => {
            let response = orchestrator
                .handle_message(&text)
                .await
                .context("chat loop failed")?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn build_agent(config: &AppConfig) -> anyhow::Result<Arc<dyn Agent>> {
    let api_key = config
        .api_key
        .clone()
        .context("GOOGLE_API_KEY is not set (env or [agent] api_key in calbot.toml)")?;
    let instructions = std::fs::read_to_string(&config.instructions_path).with_context(|| {
        format!(
            "failed to read agent instructions at {}",
            config.instructions_path.display()
        )
    })?;
    let store = FileHistoryStore::new(config.history_path.clone());
    let agent = GeminiAgent::new(api_key, config.model.clone(), instructions, Box::new(store))?;
    Ok(Arc::new(agent))
}

fn build_calendar(config: &AppConfig) -> anyhow::Result<Arc<dyn CalendarService>> {
    match (&config.calendar_token, &config.calendar_id) {
        (Some(token), Some(id)) => {
            tracing::info!(calendar_id = %id, "using Google Calendar backend");
            Ok(Arc::new(GoogleCalendar::new(token.clone(), id.clone())?))
        }
        _ => {
            tracing::warn!("no calendar credentials configured, using in-memory backend");
            Ok(Arc::new(InMemoryCalendar::new()))
        }
    }
}
