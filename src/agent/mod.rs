//! Agent collaborator: the conversational model behind the loop.

pub mod gemini;
pub mod history;
pub mod turn;

pub use turn::AgentTurn;

use async_trait::async_trait;

use crate::error::AgentError;

/// One round-trip to the conversational model.
///
/// `prompt` is either plain user text (with the loop's timestamp marker) or a
/// JSON-encoded system-role message carrying a formatted command result;
/// implementations must accept both without caring which.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn send_turn(&self, prompt: &str) -> Result<AgentTurn, AgentError>;
}
