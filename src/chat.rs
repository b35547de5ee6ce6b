//! The agent/dispatcher conversation loop.
//!
//! One user message drives a bounded exchange: send the prompt to the agent,
//! execute the command embedded in its reply (if any), feed the formatted
//! result back, repeat. The loop runs the state machine
//! `AwaitingAgent -> ExecutingCommand -> ... -> Done`; an unrecoverable agent
//! failure is the `Failed` exit and surfaces as `Err` for the boundary to
//! translate. Everything that goes wrong during command execution is
//! absorbed into an apology turn here -- raw errors, command strings and
//! collaborator payloads never reach the final response.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::agent::{Agent, AgentTurn};
use crate::calendar::{CalendarResult, CalendarService};
use crate::dispatch::dispatch;
use crate::error::AgentError;
use crate::format::{enhance_casual, format_result};

/// Hard cap on command-execution round-trips within one user message. Keeps
/// worst-case latency bounded even if the agent keeps emitting commands.
pub const MAX_SYSTEM_ITERATIONS: usize = 2;

const APOLOGY: &str = "Having trouble with that request. Let's try again.";
const DEFAULT_CASUAL: &str = "How can I help with your schedule?";

#[derive(Debug, Serialize)]
pub struct ChatMetadata {
    pub processed_commands: usize,
    pub last_intent: Option<String>,
}

/// The sanitized outward reply for one user message.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub role: String,
    pub response: String,
    pub metadata: ChatMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    AwaitingAgent,
    ExecutingCommand,
    Done,
}

pub struct Orchestrator {
    agent: Arc<dyn Agent>,
    calendar: Arc<dyn CalendarService>,
}

impl Orchestrator {
    pub fn new(agent: Arc<dyn Agent>, calendar: Arc<dyn CalendarService>) -> Self {
        Orchestrator { agent, calendar }
    }

    /// Run the full loop for one user message.
    ///
    /// Returns `Err` only when the agent call itself fails unrecoverably;
    /// command-execution failures are converted to an apology reply inside
    /// the loop.
    pub async fn handle_message(&self, text: &str) -> Result<ChatResponse, AgentError> {
        let mut prompt = format!("{text} system: stamp:[{}]", Utc::now().to_rfc3339());
        let mut iterations = 0usize;
        let mut turn = AgentTurn::placeholder();
        let mut last_result: Option<CalendarResult> = None;
        let mut command_failed = false;
        let mut state = LoopState::AwaitingAgent;

        loop {
            match state {
                LoopState::AwaitingAgent => {
                    turn = match self.agent.send_turn(&prompt).await {
                        Ok(t) => t,
                        Err(AgentError::ReplyMalformed(message)) => {
                            tracing::warn!(%message, "agent reply malformed, substituting placeholder");
                            AgentTurn::placeholder()
                        }
                        // Failed: the boundary owns the generic internal reply.
                        Err(e) => return Err(e),
                    };

                    state = if turn.system.is_empty() {
                        LoopState::Done
                    } else if iterations < MAX_SYSTEM_ITERATIONS {
                        LoopState::ExecutingCommand
                    } else {
                        // A 3rd command would blow the bound; truncate to an
                        // apology instead of silently ignoring it.
                        tracing::warn!(iterations, "iteration bound reached with a pending command");
                        turn.casual = APOLOGY.to_string();
                        turn.system.clear();
                        command_failed = true;
                        LoopState::Done
                    };
                }

                LoopState::ExecutingCommand => {
                    match dispatch(&turn.system, self.calendar.as_ref()).await {
                        Ok(result) => {
                            let formatted = format_result(&result);
                            tracing::info!(iteration = iterations, "command dispatched");
                            last_result = Some(result);
                            iterations += 1;
                            // Result goes back to the agent as a system-role
                            // message; the next reply decides what happens.
                            prompt = json!({
                                "role": "system",
                                "content": formatted.to_string(),
                                "timestamp": Utc::now().to_rfc3339(),
                            })
                            .to_string();
                            state = LoopState::AwaitingAgent;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "command execution failed");
                            turn.casual = APOLOGY.to_string();
                            turn.system.clear();
                            command_failed = true;
                            state = LoopState::Done;
                        }
                    }
                }

                LoopState::Done => break,
            }
        }

        let mut casual = if turn.casual.is_empty() {
            DEFAULT_CASUAL.to_string()
        } else {
            turn.casual.clone()
        };
        if !command_failed {
            if let Some(result) = &last_result {
                casual = enhance_casual(&casual, result);
            }
        }

        Ok(ChatResponse {
            role: "assistant".to_string(),
            response: casual,
            metadata: ChatMetadata {
                processed_commands: iterations,
                last_intent: turn.intent().map(str::to_string),
            },
        })
    }
}
