//! Conversation history with injected persistence.
//!
//! The history is an explicit value owned by the agent client for the
//! session; how it is persisted is a [`HistoryStore`] concern. Production
//! uses the JSON-file store (load at start, save after every turn), tests
//! substitute the in-memory store.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationHistory {
    pub entries: Vec<HistoryEntry>,
}

impl ConversationHistory {
    pub fn push(&mut self, role: impl Into<String>, text: impl Into<String>) {
        self.entries.push(HistoryEntry {
            role: role.into(),
            text: text.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<ConversationHistory, AgentError>;
    fn save(&self, history: &ConversationHistory) -> Result<(), AgentError>;
}

/// JSON file on disk; a missing file loads as an empty history.
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileHistoryStore { path: path.into() }
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<ConversationHistory, AgentError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AgentError::History(format!("corrupt history at {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no history file, starting empty");
                Ok(ConversationHistory::default())
            }
            Err(e) => Err(AgentError::History(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn save(&self, history: &ConversationHistory) -> Result<(), AgentError> {
        let contents = serde_json::to_string(history)
            .map_err(|e| AgentError::History(e.to_string()))?;
        std::fs::write(&self.path, contents).map_err(|e| {
            AgentError::History(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

/// History held in memory only. Test substitute for the file store.
#[derive(Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<ConversationHistory>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<ConversationHistory, AgentError> {
        Ok(self
            .inner
            .lock()
            .map_err(|_| AgentError::History("history lock poisoned".to_string()))?
            .clone())
    }

    fn save(&self, history: &ConversationHistory) -> Result<(), AgentError> {
        *self
            .inner
            .lock()
            .map_err(|_| AgentError::History("history lock poisoned".to_string()))? =
            history.clone();
        Ok(())
    }
}
