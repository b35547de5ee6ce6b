use serde::Deserialize;
use std::path::PathBuf;

/// The TOML file structure for calbot.toml.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub general: Option<GeneralConfig>,
    pub agent: Option<AgentConfig>,
    pub calendar: Option<CalendarConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub model: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    pub api_key: Option<String>,
    pub instructions: Option<String>,
    pub history: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarConfig {
    pub id: Option<String>,
    pub token: Option<String>,
}

impl ConfigFile {
    pub fn to_partial(self) -> PartialConfig {
        let general = self.general;
        let agent = self.agent;
        let calendar = self.calendar;
        PartialConfig {
            model: general.as_ref().and_then(|g| g.model.clone()),
            port: general.as_ref().and_then(|g| g.port),
            api_key: agent.as_ref().and_then(|a| a.api_key.clone()),
            instructions_path: agent
                .as_ref()
                .and_then(|a| a.instructions.as_ref().map(PathBuf::from)),
            history_path: agent
                .as_ref()
                .and_then(|a| a.history.as_ref().map(PathBuf::from)),
            calendar_id: calendar.as_ref().and_then(|c| c.id.clone()),
            calendar_token: calendar.as_ref().and_then(|c| c.token.clone()),
        }
    }
}

/// Fully-resolved runtime configuration.
///
/// `api_key`, `calendar_id` and `calendar_token` stay optional here: the
/// builder in main decides whether a missing credential means "fail" (agent)
/// or "fall back to the in-memory backend" (calendar).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub port: u16,
    pub api_key: Option<String>,
    pub instructions_path: PathBuf,
    pub history_path: PathBuf,
    pub calendar_id: Option<String>,
    pub calendar_token: Option<String>,
}

/// Partial config used during merge. All fields are Option so that missing
/// fields don't override lower-priority values.
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    pub model: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub instructions_path: Option<PathBuf>,
    pub history_path: Option<PathBuf>,
    pub calendar_id: Option<String>,
    pub calendar_token: Option<String>,
}
