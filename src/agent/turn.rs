//! The structured reply contract with the conversational model.
//!
//! The agent is instructed to answer with a single JSON object:
//! `{"casual": "...", "system": "...", "insight": {...}}`. `casual` is the
//! user-facing text, `system` (when non-empty) carries exactly one calendar
//! command, and `insight` is free-form metadata (the loop only reads
//! `insight.intent`). Models love wrapping JSON in markdown fences, so those
//! are stripped before parsing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AgentError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentTurn {
    #[serde(default)]
    pub casual: String,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub insight: Map<String, Value>,
}

impl AgentTurn {
    /// The safe substitute used when the model's reply cannot be parsed.
    pub fn placeholder() -> Self {
        AgentTurn {
            casual: "Let me check that for you...".to_string(),
            system: String::new(),
            insight: Map::new(),
        }
    }

    /// Parse raw model output into a turn, tolerating markdown code fences.
    pub fn from_model_text(text: &str) -> Result<Self, AgentError> {
        let cleaned = strip_code_fences(text);
        serde_json::from_str(&cleaned).map_err(|e| {
            AgentError::ReplyMalformed(format!("{e} (reply started with `{}`)", head(&cleaned, 40)))
        })
    }

    pub fn intent(&self) -> Option<&str> {
        self.insight.get("intent").and_then(Value::as_str)
    }
}

/// Remove ```json / ``` fences and surrounding whitespace.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn head(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
