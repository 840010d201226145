//! Google Calendar v3 wire types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---- freebusy ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyRequest {
    pub time_min: String,
    pub time_max: String,
    pub items: Vec<FreeBusyItem>,
}

#[derive(Debug, Serialize)]
pub struct FreeBusyItem {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: HashMap<String, CalendarBusy>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarBusy {
    #[serde(default)]
    pub busy: Vec<BusyPeriod>,
}

#[derive(Debug, Deserialize)]
pub struct BusyPeriod {
    pub start: String,
    pub end: String,
}

// ---- events ----

#[derive(Debug, Serialize)]
pub struct GoogleEventBody {
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub start: GoogleEventTime,
    pub end: GoogleEventTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<GoogleAttendee>,
    pub reminders: GoogleReminders,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoogleEventTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoogleAttendee {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct GoogleReminders {
    #[serde(rename = "useDefault")]
    pub use_default: bool,
    pub overrides: Vec<GoogleReminderOverride>,
}

#[derive(Debug, Serialize)]
pub struct GoogleReminderOverride {
    pub method: String,
    pub minutes: u32,
}

#[derive(Debug, Deserialize)]
pub struct GoogleEventResponse {
    pub id: String,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventsListResponse {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: GoogleEventTime,
    pub end: GoogleEventTime,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
}

// ---- oauth ----

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}
