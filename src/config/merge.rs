use super::schema::{AppConfig, PartialConfig};
use std::path::PathBuf;

impl PartialConfig {
    /// Merge self with a lower-priority fallback.
    /// Self's non-None values take precedence.
    pub fn with_fallback(self, fallback: PartialConfig) -> PartialConfig {
        PartialConfig {
            model: self.model.or(fallback.model),
            port: self.port.or(fallback.port),
            api_key: self.api_key.or(fallback.api_key),
            instructions_path: self.instructions_path.or(fallback.instructions_path),
            history_path: self.history_path.or(fallback.history_path),
            calendar_id: self.calendar_id.or(fallback.calendar_id),
            calendar_token: self.calendar_token.or(fallback.calendar_token),
        }
    }

    /// Convert to AppConfig, filling any remaining gaps with defaults.
    pub fn finalize(self) -> AppConfig {
        AppConfig {
            model: self
                .model
                .unwrap_or_else(|| "gemini-2.0-flash-lite".to_string()),
            port: self.port.unwrap_or(8000),
            api_key: self.api_key,
            instructions_path: self
                .instructions_path
                .unwrap_or_else(|| PathBuf::from("agent_instructions.txt")),
            history_path: self
                .history_path
                .unwrap_or_else(|| PathBuf::from("chat_history.json")),
            calendar_id: self.calendar_id,
            calendar_token: self.calendar_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priority_wins() {
        let high = PartialConfig {
            model: Some("gemini-1.5-pro".to_string()),
            ..Default::default()
        };
        let low = PartialConfig {
            model: Some("gemini-2.0-flash-lite".to_string()),
            port: Some(9000),
            ..Default::default()
        };
        let merged = high.with_fallback(low);
        assert_eq!(merged.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(merged.port, Some(9000));
    }

    #[test]
    fn finalize_fills_defaults() {
        let config = PartialConfig::default().finalize();
        assert_eq!(config.model, "gemini-2.0-flash-lite");
        assert_eq!(config.port, 8000);
        assert!(config.api_key.is_none());
        assert_eq!(config.history_path, PathBuf::from("chat_history.json"));
    }
}
