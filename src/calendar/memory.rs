//! In-memory calendar backend.
//!
//! Stands in for the remote service in tests and in credential-less
//! development runs. Honors the same contracts the dispatcher relies on:
//! listing is sorted by start ascending, filtered to the window, capped at
//! `max_results`; updates merge only the provided fields; deleting a missing
//! id reports `false`. One deliberate divergence from the Google backend:
//! absent `time_min`/`time_max` bounds are left open rather than defaulted
//! to [now, now + 30 days], so seeded tests see every stored event no matter
//! when they run.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::calendar::{
    CalendarService, EventDetails, EventPatch, EventRecord, EventTime, ListParams,
};
use crate::error::CalendarError;

#[derive(Default)]
pub struct InMemoryCalendar {
    events: Mutex<Vec<EventRecord>>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records. Test convenience.
    pub fn with_events(events: Vec<EventRecord>) -> Self {
        InMemoryCalendar {
            events: Mutex::new(events),
        }
    }
}

/// Comparable key for a timestamp string; unparseable text sorts last.
fn sort_key(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return i64::MAX;
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp();
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return dt.and_utc().timestamp();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.and_utc().timestamp();
        }
    }
    i64::MAX
}

#[async_trait]
impl CalendarService for InMemoryCalendar {
    async fn create_event(&self, details: &EventDetails) -> Result<EventRecord, CalendarError> {
        let id = Uuid::new_v4().to_string();
        let record = EventRecord {
            id: Some(id.clone()),
            summary: Some(details.summary.clone()),
            html_link: Some(format!("https://calendar.google.com/event?eid={id}")),
            start: EventTime {
                date_time: Some(details.start_time.clone()),
                date: None,
                time_zone: Some(details.timezone.clone()),
            },
            end: EventTime {
                date_time: Some(details.end_time.clone()),
                date: None,
                time_zone: Some(details.timezone.clone()),
            },
            location: details.location.clone(),
            description: details.description.clone(),
            status: Some("confirmed".to_string()),
        };
        self.events.lock().await.push(record.clone());
        Ok(record)
    }

    async fn list_events(&self, params: &ListParams) -> Result<Vec<EventRecord>, CalendarError> {
        let events = self.events.lock().await;
        let min = params.time_min.as_deref().map(|t| sort_key(Some(t)));
        let max = params.time_max.as_deref().map(|t| sort_key(Some(t)));

        let mut matching: Vec<EventRecord> = events
            .iter()
            .filter(|e| {
                let start = sort_key(e.start.raw());
                min.is_none_or(|m| start >= m) && max.is_none_or(|m| start <= m)
            })
            .cloned()
            .collect();
        matching.sort_by_key(|e| sort_key(e.start.raw()));
        matching.truncate(params.max_results as usize);
        Ok(matching)
    }

    async fn update_event(
        &self,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<EventRecord, CalendarError> {
        let mut events = self.events.lock().await;
        let record = events
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(event_id))
            .ok_or_else(|| CalendarError::Service {
                status: 404,
                message: format!("event not found: {event_id}"),
            })?;

        if let Some(summary) = &patch.summary {
            record.summary = Some(summary.clone());
        }
        if let Some(start_time) = &patch.start_time {
            record.start.date_time = Some(start_time.clone());
        }
        if let Some(end_time) = &patch.end_time {
            record.end.date_time = Some(end_time.clone());
        }
        if let Some(timezone) = &patch.timezone {
            record.start.time_zone = Some(timezone.clone());
            record.end.time_zone = Some(timezone.clone());
        }
        if let Some(description) = &patch.description {
            record.description = Some(description.clone());
        }
        if let Some(location) = &patch.location {
            record.location = Some(location.clone());
        }
        Ok(record.clone())
    }

    async fn delete_event(&self, event_id: &str) -> Result<bool, CalendarError> {
        let mut events = self.events.lock().await;
        let before = events.len();
        events.retain(|e| e.id.as_deref() != Some(event_id));
        Ok(events.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(summary: &str, start: &str, end: &str) -> EventDetails {
        EventDetails {
            summary: summary.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            timezone: "UTC".to_string(),
            description: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn list_sorts_by_start_ascending() {
        let cal = InMemoryCalendar::new();
        cal.create_event(&details("B", "2025-07-03T09:00:00Z", "2025-07-03T10:00:00Z"))
            .await
            .unwrap();
        cal.create_event(&details("A", "2025-07-01T09:00:00Z", "2025-07-01T10:00:00Z"))
            .await
            .unwrap();
        cal.create_event(&details("C", "2025-07-05T09:00:00Z", "2025-07-05T10:00:00Z"))
            .await
            .unwrap();

        let events = cal.list_events(&ListParams::default()).await.unwrap();
        let names: Vec<_> = events.iter().filter_map(|e| e.summary.clone()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn list_filters_to_window_and_caps_results() {
        let cal = InMemoryCalendar::new();
        for day in 1..=9 {
            cal.create_event(&details(
                &format!("e{day}"),
                &format!("2025-07-0{day}T09:00:00Z"),
                &format!("2025-07-0{day}T10:00:00Z"),
            ))
            .await
            .unwrap();
        }

        let params = ListParams {
            time_min: Some("2025-07-03T00:00:00Z".to_string()),
            time_max: Some("2025-07-08T00:00:00Z".to_string()),
            max_results: 3,
        };
        let events = cal.list_events(&params).await.unwrap();
        let names: Vec<_> = events.iter().filter_map(|e| e.summary.clone()).collect();
        assert_eq!(names, ["e3", "e4", "e5"]);
    }

    #[tokio::test]
    async fn update_merges_only_provided_fields() {
        let cal = InMemoryCalendar::new();
        let created = cal
            .create_event(&details("Standup", "2025-07-02T09:00:00Z", "2025-07-02T09:15:00Z"))
            .await
            .unwrap();
        let id = created.id.unwrap();

        let patch = EventPatch {
            location: Some("Room 4".to_string()),
            ..Default::default()
        };
        let updated = cal.update_event(&id, &patch).await.unwrap();

        assert_eq!(updated.location.as_deref(), Some("Room 4"));
        assert_eq!(updated.summary.as_deref(), Some("Standup"));
        assert_eq!(updated.start.date_time.as_deref(), Some("2025-07-02T09:00:00Z"));
        assert_eq!(updated.end.date_time.as_deref(), Some("2025-07-02T09:15:00Z"));
    }

    #[tokio::test]
    async fn update_missing_event_is_service_error() {
        let cal = InMemoryCalendar::new();
        let err = cal
            .update_event("nope", &EventPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::Service { status: 404, .. }));
    }

    #[tokio::test]
    async fn delete_reports_false_for_missing_and_repeated_ids() {
        let cal = InMemoryCalendar::new();
        let created = cal
            .create_event(&details("X", "2025-07-02T09:00:00Z", "2025-07-02T09:15:00Z"))
            .await
            .unwrap();
        let id = created.id.unwrap();

        assert!(cal.delete_event(&id).await.unwrap());
        assert!(!cal.delete_event(&id).await.unwrap());
        assert!(!cal.delete_event("never-existed").await.unwrap());
    }
}
