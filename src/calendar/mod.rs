//! Calendar collaborator interface and its wire types.
//!
//! The scheduling service is external; this module defines the narrow trait
//! the dispatcher calls plus the event shapes on the wire (Google Calendar v3
//! field names). Two implementations exist: [`google::GoogleCalendar`] for
//! the real service and [`memory::InMemoryCalendar`] for tests and
//! credential-less development.

pub mod google;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CalendarError;

/// Validated payload for `create_event`. `start_time` / `end_time` have been
/// checked as ISO-8601 by the command layer before this struct exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetails {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Partial-update payload for `update_event`. Fields left `None` are not
/// touched on the existing record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Query parameters for `list_events`. Missing bounds default to
/// [now, now + 30 days] at the collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub time_min: Option<String>,
    #[serde(default)]
    pub time_max: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams {
            time_min: None,
            time_max: None,
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> u32 {
    50
}

/// One side of an event's time span, in Google Calendar wire shape: either a
/// `dateTime` (timed event) or a `date` (all-day event).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    /// The raw timestamp text, preferring `dateTime` over `date`.
    pub fn raw(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// An event record as returned by the calendar collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(
        rename = "htmlLink",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub html_link: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Outcome of a `delete_event` dispatch. A missing id yields
/// `status: "failed"`, never an error, so the loop can report it
/// conversationally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteStatus {
    pub status: String,
    pub event_id: String,
}

impl DeleteStatus {
    pub fn new(deleted: bool, event_id: impl Into<String>) -> Self {
        DeleteStatus {
            status: if deleted { "success" } else { "failed" }.to_string(),
            event_id: event_id.into(),
        }
    }
}

/// Everything a successful dispatch can produce.
#[derive(Debug, Clone)]
pub enum CalendarResult {
    Created(EventRecord),
    Updated(EventRecord),
    Events(Vec<EventRecord>),
    Deleted(DeleteStatus),
}

/// The calendar collaborator. Listing is expected to return events sorted by
/// start time ascending with recurring events expanded to single occurrences
/// within the window; that guarantee lives on the collaborator side.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn create_event(&self, details: &EventDetails) -> Result<EventRecord, CalendarError>;

    async fn list_events(&self, params: &ListParams) -> Result<Vec<EventRecord>, CalendarError>;

    async fn update_event(
        &self,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<EventRecord, CalendarError>;

    /// Returns `Ok(false)` when the event does not exist (including an
    /// already-deleted id), reserving `Err` for transport or service faults.
    async fn delete_event(&self, event_id: &str) -> Result<bool, CalendarError>;
}

/// Build the Google-wire event body for a create call.
pub(crate) fn event_body(details: &EventDetails) -> Value {
    let mut body = serde_json::json!({
        "summary": details.summary,
        "start": { "dateTime": details.start_time, "timeZone": details.timezone },
        "end": { "dateTime": details.end_time, "timeZone": details.timezone },
    });
    if let Some(description) = &details.description {
        body["description"] = Value::String(description.clone());
    }
    if let Some(location) = &details.location {
        body["location"] = Value::String(location.clone());
    }
    body
}
