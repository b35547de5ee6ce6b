use std::path::PathBuf;

/// Errors related to configuration loading and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config at {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Errors raised while parsing and validating a system command.
///
/// Every failure mode carries a descriptive message. The conversation loop
/// absorbs these into a user-safe apology turn, so the message is for logs
/// and tests, never for the end user.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Malformed command: {0}")]
    Malformed(String),

    #[error("Could not decode command arguments `{fragment}`: {message}")]
    ArgumentDecode { fragment: String, message: String },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid event details: {0}")]
    Validation(String),
}

/// Errors reported by the calendar collaborator.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Calendar request failed: {0}")]
    Http(String),

    #[error("Calendar service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Calendar authentication failed: {0}")]
    Auth(String),
}

/// Errors raised by the agent collaborator.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Agent reply was not a structured turn: {0}")]
    ReplyMalformed(String),

    #[error("Agent connection error: {0}")]
    Http(String),

    #[error("Conversation history error: {0}")]
    History(String),
}

/// A failure during command execution: either the command itself was bad or
/// the calendar collaborator rejected it. Both are absorbed at the loop
/// boundary and never reach the outward response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}
