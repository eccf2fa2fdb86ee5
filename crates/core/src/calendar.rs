//! # Meeting Fetcher
//!
//! Lists the user's next few calendar events. Failures are logged and
//! reported as "no meetings"; the orchestrator decides what that means.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;

use crate::config::CatalystConfig;
use crate::error::{ensure_success, read_json, CatalystError};
use crate::models::Meeting;

const SERVICE: &str = "Google Calendar";
/// Number of upcoming events requested per run
pub const MAX_MEETINGS: u32 = 5;
const DEFAULT_TITLE: &str = "No Title";

/// Reads upcoming events from the primary calendar
#[derive(Clone)]
pub struct MeetingFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl MeetingFetcher {
    pub fn new(config: &CatalystConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.endpoints.calendar.clone(),
        }
    }

    /// Upcoming events from now, soonest first, at most [`MAX_MEETINGS`].
    pub async fn upcoming_meetings(&self, access_token: &str) -> Vec<Meeting> {
        self.upcoming_meetings_from(access_token, Utc::now()).await
    }

    /// Same as [`upcoming_meetings`](Self::upcoming_meetings) with an explicit lower bound
    pub async fn upcoming_meetings_from(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Vec<Meeting> {
        match self.list_events(access_token, now).await {
            Ok(meetings) => {
                tracing::debug!(count = meetings.len(), "Fetched upcoming meetings");
                meetings
            }
            Err(e) => {
                tracing::warn!(error = %e, "Google Calendar API error");
                Vec::new()
            }
        }
    }

    async fn list_events(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, CatalystError> {
        let url = format!("{}/calendars/primary/events", self.base_url);
        let query = [
            ("timeMin", now.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("maxResults", MAX_MEETINGS.to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await?;

        let response = ensure_success(SERVICE, response).await?;
        let events: EventsResponse = read_json(SERVICE, response).await?;
        Ok(events.items.into_iter().map(Meeting::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
struct CalendarEvent {
    summary: Option<String>,
    #[serde(default)]
    attendees: Vec<Attendee>,
    start: Option<EventDateTime>,
}

#[derive(Debug, Deserialize)]
struct Attendee {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    date_time: Option<DateTime<Utc>>,
    /// All-day events carry a plain date
    date: Option<NaiveDate>,
}

impl EventDateTime {
    fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.date_time.or_else(|| {
            self.date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
    }
}

impl From<CalendarEvent> for Meeting {
    fn from(event: CalendarEvent) -> Self {
        Meeting {
            title: event
                .summary
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            attendees: event
                .attendees
                .into_iter()
                .filter_map(|a| a.email)
                .filter(|email| !email.trim().is_empty())
                .collect(),
            start: event.start.as_ref().and_then(EventDateTime::to_utc),
        }
    }
}
