//! Gemini `generateContent` client for the agent collaborator.
//!
//! Sends the system instruction plus the full conversation history on every
//! call, appends the new exchange, and persists the history through the
//! injected [`HistoryStore`]. The model is told (via the instruction file) to
//! answer with the JSON turn contract; [`AgentTurn::from_model_text`] handles
//! fence-stripping and parsing.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::agent::history::{ConversationHistory, HistoryStore};
use crate::agent::{Agent, AgentTurn};
use crate::error::AgentError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiAgent {
    http: reqwest::Client,
    api_key: String,
    model: String,
    system_instruction: String,
    store: Box<dyn HistoryStore>,
    history: Mutex<ConversationHistory>,
    base_url: String,
}

impl GeminiAgent {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        system_instruction: impl Into<String>,
        store: Box<dyn HistoryStore>,
    ) -> Result<Self, AgentError> {
        let history = store.load()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AgentError::Http(format!("failed to build client: {e}")))?;
        Ok(GeminiAgent {
            http,
            api_key: api_key.into(),
            model: model.into(),
            system_instruction: system_instruction.into(),
            store,
            history: Mutex::new(history),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_body(&self, history: &ConversationHistory, prompt: &str) -> Value {
        let mut contents: Vec<Value> = history
            .entries
            .iter()
            .map(|entry| {
                json!({
                    "role": entry.role,
                    "parts": [{"text": entry.text}],
                })
            })
            .collect();
        contents.push(json!({
            "role": "user",
            "parts": [{"text": prompt}],
        }));

        json!({
            "system_instruction": { "parts": [{"text": self.system_instruction}] },
            "contents": contents,
            "generationConfig": {
                "temperature": 1.0,
                "topP": 0.95,
                "maxOutputTokens": 8192,
            },
        })
    }
}

/// Pull the first candidate's text out of a generateContent response.
fn extract_text(response: &Value) -> Result<&str, AgentError> {
    response["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| {
            AgentError::ReplyMalformed("generateContent response had no candidate text".to_string())
        })
}

#[async_trait]
impl Agent for GeminiAgent {
    async fn send_turn(&self, prompt: &str) -> Result<AgentTurn, AgentError> {
        // Hold the history lock across the call so concurrent requests on one
        // session cannot interleave entries.
        let mut history = self.history.lock().await;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let response = self
            .http
            .post(&url)
            .json(&self.request_body(&history, prompt))
            .send()
            .await
            .map_err(|e| AgentError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Http(format!(
                "generateContent returned HTTP {status}: {}",
                head(&body, 200)
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AgentError::Http(e.to_string()))?;
        let raw_text = extract_text(&payload)?;
        let turn = AgentTurn::from_model_text(raw_text)?;

        history.push("user", prompt);
        history.push("model", raw_text);
        self.store.save(&history)?;
        tracing::debug!(entries = history.len(), "conversation history persisted");

        Ok(turn)
    }
}

fn head(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
