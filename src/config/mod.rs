pub mod merge;
pub mod schema;

pub use schema::*;

use crate::cli::{Cli, Commands};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Load configuration by merging global, local, environment, and CLI sources.
/// Precedence: CLI > environment > local config > global config > defaults.
///
/// Missing config files are handled gracefully (defaults apply).
pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    // Layer 1: Global config (~/.config/calbot/calbot.toml or platform equivalent)
    let global = load_global_config();

    // Layer 2: Local config (--config path, or ./calbot.toml)
    let local_path = cli_config_path(cli).unwrap_or_else(|| PathBuf::from("calbot.toml"));
    let local = load_toml_file(&local_path).unwrap_or_default();

    // Layer 3: Environment variables (secrets live here by default)
    let env = env_to_partial();

    // Layer 4: CLI args
    let cli_partial = cli_to_partial(cli);

    let config = cli_partial
        .with_fallback(env)
        .with_fallback(local)
        .with_fallback(global)
        .finalize();

    Ok(config)
}

fn load_global_config() -> PartialConfig {
    match global_config_path() {
        Some(p) => load_toml_file(&p).unwrap_or_default(),
        None => {
            tracing::debug!("Could not determine global config directory");
            PartialConfig::default()
        }
    }
}

/// Load and parse a TOML config file into a PartialConfig.
/// Returns None on file-not-found; logs parse errors.
fn load_toml_file(path: &Path) -> Option<PartialConfig> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            match toml::from_str::<ConfigFile>(&contents)
                .context(format!("Failed to parse {}", path.display()))
            {
                Ok(config_file) => {
                    tracing::info!("Loaded config from {}", path.display());
                    Some(config_file.to_partial())
                }
                Err(e) => {
                    tracing::warn!("Config parse error: {:#}", e);
                    None
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            None
        }
        Err(e) => {
            tracing::warn!("Failed to read config at {}: {}", path.display(), e);
            None
        }
    }
}

/// Resolve the platform-specific global config path.
/// Linux: ~/.config/calbot/calbot.toml
fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "calbot")
        .map(|dirs| dirs.config_dir().join("calbot.toml"))
}

fn env_to_partial() -> PartialConfig {
    PartialConfig {
        api_key: std::env::var("GOOGLE_API_KEY").ok().filter(|v| !v.is_empty()),
        calendar_id: std::env::var("CALENDAR_ID").ok().filter(|v| !v.is_empty()),
        calendar_token: std::env::var("CALENDAR_TOKEN").ok().filter(|v| !v.is_empty()),
        ..Default::default()
    }
}

fn cli_config_path(cli: &Cli) -> Option<PathBuf> {
    match &cli.command {
        Commands::Serve { config, .. } => config.clone(),
        Commands::Ask { config, .. } => config.clone(),
    }
}

/// Convert CLI arguments to a PartialConfig for merging.
fn cli_to_partial(cli: &Cli) -> PartialConfig {
    match &cli.command {
        Commands::Serve {
            model,
            port,
            config: _,
        } => PartialConfig {
            model: model.clone(),
            port: *port,
            ..Default::default()
        },
        Commands::Ask {
            model, config: _, ..
        } => PartialConfig {
            model: model.clone(),
            ..Default::default()
        },
    }
}
