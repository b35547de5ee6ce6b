//! Typed system commands.
//!
//! The four calendar operations form a closed set, so a command's name maps
//! into the [`Operation`] enum rather than a runtime registry: adding an
//! operation means adding a variant and the compiler points at every match
//! that needs updating. Argument validation (required fields, ISO-8601
//! timestamps) happens here, before any collaborator call.

pub mod literal;
pub mod parser;

pub use parser::Command;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::calendar::{EventDetails, EventPatch, ListParams};
use crate::command::parser::{decode_args, split_update_args, strip_id_quotes};
use crate::error::CommandError;

/// A fully parsed and validated calendar operation.
#[derive(Debug, Clone)]
pub enum Operation {
    Create(EventDetails),
    List(ListParams),
    Update {
        event_id: String,
        patch: EventPatch,
    },
    Delete {
        event_id: String,
    },
}

impl Operation {
    /// Build an operation from a textual [`Command`].
    ///
    /// Unknown names fail with [`CommandError::UnknownOperation`]; argument
    /// problems fail with decode or validation errors. No collaborator is
    /// touched on any failure path.
    pub fn from_command(command: &Command) -> Result<Operation, CommandError> {
        match command.name.as_str() {
            "create_event" => {
                let payload = decode_args(&command.raw_args)?;
                Ok(Operation::Create(event_details_from_value(payload)?))
            }
            "list_events" => {
                let payload = decode_args(&command.raw_args)?;
                Ok(Operation::List(list_params_from_value(payload)?))
            }
            "update_event" => {
                let (event_id, rest) = split_update_args(&command.raw_args)?;
                let payload = decode_args(&rest)?;
                Ok(Operation::Update {
                    event_id,
                    patch: event_patch_from_value(payload)?,
                })
            }
            "delete_event" => {
                let event_id = strip_id_quotes(&command.raw_args);
                if event_id.is_empty() {
                    return Err(CommandError::Validation(
                        "delete_event requires an event id".to_string(),
                    ));
                }
                Ok(Operation::Delete { event_id })
            }
            other => Err(CommandError::UnknownOperation(other.to_string())),
        }
    }

    /// Parse and validate a full command string in one step.
    pub fn parse(input: &str) -> Result<Operation, CommandError> {
        let command = Command::parse(input)?;
        Operation::from_command(&command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Create(_) => "create_event",
            Operation::List(_) => "list_events",
            Operation::Update { .. } => "update_event",
            Operation::Delete { .. } => "delete_event",
        }
    }
}

/// Check that a timestamp string is ISO-8601: RFC 3339, a naive datetime, or
/// a bare date. Anything else is a validation error, never coerced.
pub fn validate_timestamp(value: &str) -> Result<(), CommandError> {
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return Ok(());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if NaiveDateTime::parse_from_str(value, format).is_ok() {
            return Ok(());
        }
    }
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return Ok(());
    }
    Err(CommandError::Validation(format!(
        "Invalid datetime format: {value}"
    )))
}

fn event_details_from_value(payload: Value) -> Result<EventDetails, CommandError> {
    if !payload.is_object() {
        return Err(CommandError::Validation(
            "create_event expects an object payload".to_string(),
        ));
    }
    let details: EventDetails = serde_json::from_value(payload)
        .map_err(|e| CommandError::Validation(e.to_string()))?;
    if details.summary.trim().is_empty() {
        return Err(CommandError::Validation(
            "summary must not be empty".to_string(),
        ));
    }
    validate_timestamp(&details.start_time)?;
    validate_timestamp(&details.end_time)?;
    Ok(details)
}

fn list_params_from_value(payload: Value) -> Result<ListParams, CommandError> {
    if !payload.is_object() {
        return Err(CommandError::Validation(
            "list_events expects an object payload".to_string(),
        ));
    }
    serde_json::from_value(payload).map_err(|e| CommandError::Validation(e.to_string()))
}

fn event_patch_from_value(payload: Value) -> Result<EventPatch, CommandError> {
    if !payload.is_object() {
        return Err(CommandError::Validation(
            "update_event expects an object payload".to_string(),
        ));
    }
    let patch: EventPatch = serde_json::from_value(payload)
        .map_err(|e| CommandError::Validation(e.to_string()))?;
    if let Some(start) = &patch.start_time {
        validate_timestamp(start)?;
    }
    if let Some(end) = &patch.end_time {
        validate_timestamp(end)?;
    }
    Ok(patch)
}
