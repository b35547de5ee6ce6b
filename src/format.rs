//! Normalizing calendar results for agent feedback and user summaries.
//!
//! [`format_result`] is pure and total: every [`CalendarResult`] shape maps
//! to a JSON value, and timestamp rendering falls back to the original text
//! rather than erroring on anything unparseable.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use crate::calendar::{CalendarResult, EventRecord};

/// Normalize a dispatch result into the canonical feedback shape:
/// `{link, status}` for a created event with a link, `{events: [...]}` for a
/// listing, and a pass-through mapping for everything else.
pub fn format_result(result: &CalendarResult) -> Value {
    match result {
        CalendarResult::Created(record) => match &record.html_link {
            Some(link) => json!({ "link": link, "status": "completed" }),
            None => serde_json::to_value(record).unwrap_or(Value::Null),
        },
        CalendarResult::Updated(record) => {
            serde_json::to_value(record).unwrap_or(Value::Null)
        }
        CalendarResult::Events(events) => json!({
            "events": events.iter().map(format_event).collect::<Vec<_>>(),
        }),
        CalendarResult::Deleted(status) => {
            serde_json::to_value(status).unwrap_or(Value::Null)
        }
    }
}

fn format_event(event: &EventRecord) -> Value {
    json!({
        "id": event.id,
        "summary": event.summary.as_deref().unwrap_or("No title"),
        "start": format_time(event.start.raw().unwrap_or("")),
        "end": format_time(event.end.raw().unwrap_or("")),
        "location": event.location.as_deref().unwrap_or(""),
        "description": event.description.as_deref().unwrap_or(""),
    })
}

/// Render a timestamp as `09:00 AM on Jul 02`; unparseable text comes back
/// verbatim.
pub fn format_time(raw: &str) -> String {
    const DISPLAY: &str = "%I:%M %p on %b %d";
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY).to_string();
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt.format(DISPLAY).to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.format(DISPLAY).to_string();
        }
    }
    raw.to_string()
}

/// Fold the last command result into the user-facing message: an event link
/// for a creation, up to five summary lines for a listing, and a "you're
/// free" note for an empty listing.
pub fn enhance_casual(casual: &str, result: &CalendarResult) -> String {
    let mut out = casual.to_string();
    match result {
        CalendarResult::Created(record) => {
            if let Some(link) = record.html_link.as_deref() {
                if link.contains("calendar.google.com") {
                    out.push_str(&format!("\n\n📅 Event link: {link}"));
                }
            }
        }
        CalendarResult::Events(events) if events.is_empty() => {
            out.push_str("\n\nYou're totally free! 🧘 No events found.");
        }
        CalendarResult::Events(events) => {
            let lines: Vec<String> = events
                .iter()
                .take(5)
                .map(|e| {
                    format!(
                        "- {} at {}",
                        e.summary.as_deref().unwrap_or("No title"),
                        format_time(e.start.raw().unwrap_or(""))
                    )
                })
                .collect();
            out.push_str(&format!("\n\n🗓️ Upcoming events:\n{}", lines.join("\n")));
        }
        CalendarResult::Updated(_) | CalendarResult::Deleted(_) => {}
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{DeleteStatus, EventTime};

    fn standup() -> EventRecord {
        EventRecord {
            id: None,
            summary: Some("Standup".to_string()),
            start: EventTime {
                date_time: Some("2025-07-02T09:00:00Z".to_string()),
                ..Default::default()
            },
            end: EventTime {
                date_time: Some("2025-07-02T09:15:00Z".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn formats_event_listing() {
        let value = format_result(&CalendarResult::Events(vec![standup()]));
        assert_eq!(
            value,
            json!({
                "events": [{
                    "id": null,
                    "summary": "Standup",
                    "start": "09:00 AM on Jul 02",
                    "end": "09:15 AM on Jul 02",
                    "location": "",
                    "description": ""
                }]
            })
        );
    }

    #[test]
    fn formats_empty_listing() {
        let value = format_result(&CalendarResult::Events(vec![]));
        assert_eq!(value, json!({ "events": [] }));
    }

    #[test]
    fn created_event_with_link_becomes_link_status() {
        let record = EventRecord {
            html_link: Some("https://calendar.google.com/event?eid=x".to_string()),
            ..standup()
        };
        let value = format_result(&CalendarResult::Created(record));
        assert_eq!(
            value,
            json!({"link": "https://calendar.google.com/event?eid=x", "status": "completed"})
        );
    }

    #[test]
    fn created_event_without_link_passes_through() {
        let value = format_result(&CalendarResult::Created(standup()));
        assert_eq!(value["summary"], "Standup");
    }

    #[test]
    fn delete_status_passes_through() {
        let value = format_result(&CalendarResult::Deleted(DeleteStatus::new(false, "e1")));
        assert_eq!(value, json!({"status": "failed", "event_id": "e1"}));
    }

    #[test]
    fn time_formatting_falls_back_to_raw_text() {
        assert_eq!(format_time("whenever"), "whenever");
        assert_eq!(format_time(""), "");
    }

    #[test]
    fn time_formatting_handles_naive_and_date_shapes() {
        assert_eq!(format_time("2025-07-05T10:00:00"), "10:00 AM on Jul 05");
        assert_eq!(format_time("2025-07-05"), "12:00 AM on Jul 05");
    }

    #[test]
    fn enhance_adds_no_events_note() {
        let out = enhance_casual("Here's your schedule.", &CalendarResult::Events(vec![]));
        assert!(out.contains("You're totally free"));
    }

    #[test]
    fn enhance_lists_at_most_five_events() {
        let events: Vec<EventRecord> = (0..8)
            .map(|i| EventRecord {
                summary: Some(format!("e{i}")),
                ..standup()
            })
            .collect();
        let out = enhance_casual("Busy day:", &CalendarResult::Events(events));
        assert!(out.contains("- e4 at"));
        assert!(!out.contains("- e5 at"));
    }

    #[test]
    fn enhance_appends_calendar_link() {
        let record = EventRecord {
            html_link: Some("https://calendar.google.com/event?eid=x".to_string()),
            ..standup()
        };
        let out = enhance_casual("Created it.", &CalendarResult::Created(record));
        assert!(out.contains("Event link: https://calendar.google.com/event?eid=x"));
    }

    #[test]
    fn enhance_leaves_delete_untouched() {
        let out = enhance_casual("Gone.", &CalendarResult::Deleted(DeleteStatus::new(true, "e1")));
        assert_eq!(out, "Gone.");
    }
}
