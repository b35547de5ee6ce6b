//! Google Calendar v3 events client.
//!
//! Thin reqwest wrapper over the events collection of a single calendar,
//! authenticated with a ready bearer token (obtaining the token is the
//! host's concern). List calls always request `singleEvents=true` ordered by
//! start time, so recurring events come back expanded to single occurrences
//! within the window.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;

use crate::calendar::{
    event_body, CalendarService, EventDetails, EventPatch, EventRecord, ListParams,
};
use crate::error::CalendarError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Service-side cap on `maxResults`.
const MAX_RESULTS_CAP: u32 = 250;

pub struct GoogleCalendar {
    http: reqwest::Client,
    token: String,
    calendar_id: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    items: Vec<EventRecord>,
}

impl GoogleCalendar {
    pub fn new(token: impl Into<String>, calendar_id: impl Into<String>) -> Result<Self, CalendarError> {
        let token = token.into();
        let calendar_id = calendar_id.into();
        if token.is_empty() || calendar_id.is_empty() {
            return Err(CalendarError::Auth(
                "calendar token and calendar id must be provided".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CalendarError::Http(format!("failed to build client: {e}")))?;
        Ok(GoogleCalendar {
            http,
            token,
            calendar_id,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root. Used by tests against a
    /// local stand-in server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, self.calendar_id)
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), event_id)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(CalendarError::Service {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_event(&self, event_id: &str) -> Result<serde_json::Value, CalendarError> {
        let response = self
            .http
            .get(self.event_url(event_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| CalendarError::Http(e.to_string()))?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::Http(e.to_string()))
    }
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    async fn create_event(&self, details: &EventDetails) -> Result<EventRecord, CalendarError> {
        let response = self
            .http
            .post(self.events_url())
            .bearer_auth(&self.token)
            .json(&event_body(details))
            .send()
            .await
            .map_err(|e| CalendarError::Http(e.to_string()))?;
        let record: EventRecord = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::Http(e.to_string()))?;
        tracing::info!(
            event_id = record.id.as_deref().unwrap_or(""),
            "calendar event created"
        );
        Ok(record)
    }

    async fn list_events(&self, params: &ListParams) -> Result<Vec<EventRecord>, CalendarError> {
        let now = Utc::now();
        let time_min = params
            .time_min
            .clone()
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Secs, true));
        let time_max = params.time_max.clone().unwrap_or_else(|| {
            (now + chrono::Duration::days(30)).to_rfc3339_opts(SecondsFormat::Secs, true)
        });
        let max_results = params.max_results.min(MAX_RESULTS_CAP);

        let response = self
            .http
            .get(self.events_url())
            .bearer_auth(&self.token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("maxResults", &max_results.to_string()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .map_err(|e| CalendarError::Http(e.to_string()))?;
        let page: EventsPage = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::Http(e.to_string()))?;
        Ok(page.items)
    }

    async fn update_event(
        &self,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<EventRecord, CalendarError> {
        // Fetch-merge-put: only fields present in the patch are rewritten on
        // the existing record.
        let mut event = self.fetch_event(event_id).await?;
        if let Some(summary) = &patch.summary {
            event["summary"] = serde_json::Value::String(summary.clone());
        }
        if let Some(start_time) = &patch.start_time {
            event["start"]["dateTime"] = serde_json::Value::String(start_time.clone());
        }
        if let Some(end_time) = &patch.end_time {
            event["end"]["dateTime"] = serde_json::Value::String(end_time.clone());
        }
        if let Some(timezone) = &patch.timezone {
            event["start"]["timeZone"] = serde_json::Value::String(timezone.clone());
            event["end"]["timeZone"] = serde_json::Value::String(timezone.clone());
        }
        if let Some(description) = &patch.description {
            event["description"] = serde_json::Value::String(description.clone());
        }
        if let Some(location) = &patch.location {
            event["location"] = serde_json::Value::String(location.clone());
        }

        let response = self
            .http
            .put(self.event_url(event_id))
            .bearer_auth(&self.token)
            .json(&event)
            .send()
            .await
            .map_err(|e| CalendarError::Http(e.to_string()))?;
        let record: EventRecord = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::Http(e.to_string()))?;
        tracing::info!(event_id, "calendar event updated");
        Ok(record)
    }

    async fn delete_event(&self, event_id: &str) -> Result<bool, CalendarError> {
        let response = self
            .http
            .delete(self.event_url(event_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| CalendarError::Http(e.to_string()))?;
        let status = response.status();
        // 404 and 410 both mean "no such event" (410 for already-deleted
        // ids); deterministic `false`, not an error.
        if status.as_u16() == 404 || status.as_u16() == 410 {
            return Ok(false);
        }
        Self::check(response).await?;
        tracing::info!(event_id, "calendar event deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_missing_credentials() {
        assert!(matches!(
            GoogleCalendar::new("", "primary"),
            Err(CalendarError::Auth(_))
        ));
        assert!(matches!(
            GoogleCalendar::new("token", ""),
            Err(CalendarError::Auth(_))
        ));
    }

    #[test]
    fn urls_are_scoped_to_the_calendar() {
        let client = GoogleCalendar::new("token", "primary")
            .unwrap()
            .with_base_url("http://localhost:9999");
        assert_eq!(
            client.events_url(),
            "http://localhost:9999/calendars/primary/events"
        );
        assert_eq!(
            client.event_url("e1"),
            "http://localhost:9999/calendars/primary/events/e1"
        );
    }
}
