//! Google Calendar provider implementation
//!
//! Implements `CalendarPort` against the Calendar v3 REST API. All
//! timestamps cross the wire as ISO-8601 with the fixed +05:30 offset.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Method;
use slated_core::ports::{CalendarPort, EventBody};
use slated_domain::constants::{CALENDAR_TIMEZONE, PRIMARY_CALENDAR_ID};
use slated_domain::{
    fixed_offset, BusyInterval, CalendarEvent, MutationReceipt, Result, SlatedError,
    UserCredential,
};
use tracing::{debug, warn};

use super::types::{
    BusyPeriod, EventsListResponse, FreeBusyItem, FreeBusyRequest, FreeBusyResponse,
    GoogleAttendee, GoogleEvent, GoogleEventBody, GoogleEventResponse, GoogleEventTime,
    GoogleReminderOverride, GoogleReminders,
};
use crate::http::HttpClient;

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar client bound to the primary calendar.
pub struct GoogleCalendarClient {
    http: HttpClient,
    api_base: String,
}

impl GoogleCalendarClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http, api_base: GOOGLE_CALENDAR_API_BASE.to_string() }
    }

    /// Point the client at a mock server.
    #[cfg(test)]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    async fn expect_success(
        response: reqwest::Response,
        wrap: fn(String) -> SlatedError,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
        Err(wrap(format!("Google API error ({status}): {error_text}")))
    }
}

#[async_trait]
impl CalendarPort for GoogleCalendarClient {
    async fn query_busy(
        &self,
        credential: &UserCredential,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<BusyInterval>> {
        let url = format!("{}/freeBusy", self.api_base);
        let request = FreeBusyRequest {
            time_min: window_start.to_rfc3339(),
            time_max: window_end.to_rfc3339(),
            items: vec![FreeBusyItem { id: PRIMARY_CALENDAR_ID.to_string() }],
        };

        let response = self
            .http
            .send(
                self.http
                    .request(Method::POST, &url)
                    .bearer_auth(&credential.access_token)
                    .json(&request),
            )
            .await?;
        let response = Self::expect_success(response, SlatedError::Network).await?;

        let parsed: FreeBusyResponse = response.json().await.map_err(|e| {
            SlatedError::Network(format!("failed to parse freebusy response: {e}"))
        })?;

        let busy = parsed
            .calendars
            .get(PRIMARY_CALENDAR_ID)
            .map(|calendar| calendar.busy.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(parse_busy_period)
            .collect::<Vec<_>>();

        debug!(count = busy.len(), "freebusy query complete");
        Ok(busy)
    }

    async fn list_events(
        &self,
        credential: &UserCredential,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>> {
        let url = format!("{}/calendars/{}/events", self.api_base, PRIMARY_CALENDAR_ID);
        let response = self
            .http
            .send(
                self.http
                    .request(Method::GET, &url)
                    .bearer_auth(&credential.access_token)
                    .query(&[
                        ("timeMin", window_start.to_rfc3339()),
                        ("timeMax", window_end.to_rfc3339()),
                        ("singleEvents", "true".to_string()),
                        ("orderBy", "startTime".to_string()),
                    ]),
            )
            .await?;
        let response = Self::expect_success(response, SlatedError::Network).await?;

        let parsed: EventsListResponse = response.json().await.map_err(|e| {
            SlatedError::Network(format!("failed to parse events response: {e}"))
        })?;

        Ok(parsed.items.iter().filter_map(parse_event).collect())
    }

    async fn insert_event(
        &self,
        credential: &UserCredential,
        body: &EventBody,
    ) -> Result<MutationReceipt> {
        let url = format!(
            "{}/calendars/{}/events?sendUpdates=all",
            self.api_base, PRIMARY_CALENDAR_ID
        );

        let response = self
            .http
            .send(
                self.http
                    .request(Method::POST, &url)
                    .bearer_auth(&credential.access_token)
                    .json(&to_google_body(body)),
            )
            .await?;
        let response = Self::expect_success(response, SlatedError::Mutation).await?;

        let parsed: GoogleEventResponse = response.json().await.map_err(|e| {
            SlatedError::Mutation(format!("failed to parse insert response: {e}"))
        })?;
        Ok(MutationReceipt { event_id: parsed.id, html_link: parsed.html_link })
    }

    async fn update_event(
        &self,
        credential: &UserCredential,
        event_id: &str,
        body: &EventBody,
    ) -> Result<MutationReceipt> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.api_base, PRIMARY_CALENDAR_ID, event_id
        );

        let response = self
            .http
            .send(
                self.http
                    .request(Method::PUT, &url)
                    .bearer_auth(&credential.access_token)
                    .json(&to_google_body(body)),
            )
            .await?;
        let response = Self::expect_success(response, SlatedError::Mutation).await?;

        let parsed: GoogleEventResponse = response.json().await.map_err(|e| {
            SlatedError::Mutation(format!("failed to parse update response: {e}"))
        })?;
        Ok(MutationReceipt { event_id: parsed.id, html_link: parsed.html_link })
    }

    async fn delete_event(&self, credential: &UserCredential, event_id: &str) -> Result<()> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.api_base, PRIMARY_CALENDAR_ID, event_id
        );

        let response = self
            .http
            .send(
                self.http
                    .request(Method::DELETE, &url)
                    .bearer_auth(&credential.access_token),
            )
            .await?;
        Self::expect_success(response, SlatedError::Mutation).await?;
        Ok(())
    }
}

fn to_google_body(body: &EventBody) -> GoogleEventBody {
    GoogleEventBody {
        summary: body.summary.clone(),
        description: body.description.clone(),
        start: GoogleEventTime {
            date_time: Some(body.start.to_rfc3339()),
            date: None,
            time_zone: Some(CALENDAR_TIMEZONE.to_string()),
        },
        end: GoogleEventTime {
            date_time: Some(body.end.to_rfc3339()),
            date: None,
            time_zone: Some(CALENDAR_TIMEZONE.to_string()),
        },
        attendees: body
            .attendees
            .iter()
            .map(|email| GoogleAttendee { email: email.clone() })
            .collect(),
        reminders: GoogleReminders {
            use_default: false,
            overrides: body
                .reminder_minutes
                .iter()
                .map(|&minutes| GoogleReminderOverride { method: "popup".to_string(), minutes })
                .collect(),
        },
    }
}

fn parse_busy_period(period: &BusyPeriod) -> Option<BusyInterval> {
    let start = parse_instant(&period.start)?;
    let end = parse_instant(&period.end)?;
    Some(BusyInterval { start, end })
}

fn parse_event(event: &GoogleEvent) -> Option<CalendarEvent> {
    let start = parse_event_time(&event.start)?;
    let end = parse_event_time(&event.end)?;
    Some(CalendarEvent {
        id: event.id.clone(),
        title: event.summary.clone().unwrap_or_else(|| "(untitled)".to_string()),
        start,
        end,
        description: event.description.clone(),
        html_link: event.html_link.clone(),
    })
}

fn parse_event_time(time: &GoogleEventTime) -> Option<DateTime<FixedOffset>> {
    if let Some(dt) = &time.date_time {
        return parse_instant(dt);
    }
    // All-day events carry only a date; pin them to local midnight.
    let date = time.date.as_deref()?;
    let parsed = date.parse::<chrono::NaiveDate>().ok()?;
    Some(slated_domain::WallTime { hour: 0, minute: 0 }.on(parsed))
}

fn parse_instant(raw: &str) -> Option<DateTime<FixedOffset>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&fixed_offset())),
        Err(e) => {
            warn!(raw, error = %e, "unparseable timestamp from provider");
            None
        }
    }
}
