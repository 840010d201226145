//! Event model: drafts produced by extraction and events read back from the
//! remote calendar.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::schedule::WallTime;

/// Category assigned to a draft by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Meeting,
    Task,
    FocusBlock,
    Reminder,
}

impl Default for EventType {
    fn default() -> Self {
        Self::Meeting
    }
}

/// Urgency assigned to a draft by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// Structured, not-yet-committed representation of a scheduling intent.
///
/// `title` and `date` are always present on a valid draft; `time` may be
/// absent until slot search resolves it. A draft never reaches the mutator
/// without a concrete time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<WallTime>,
    #[serde(rename = "duration")]
    pub duration_hours: f64,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub flexible: bool,
}

/// Half-open interval during which the remote calendar reports the user busy.
/// Returned in arbitrary order by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl BusyInterval {
    /// Strict half-open overlap test: a shared boundary does not overlap.
    pub fn overlaps(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> bool {
        start < self.end && end > self.start
    }
}

/// An event read back from the remote calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub description: Option<String>,
    pub html_link: Option<String>,
}

impl CalendarEvent {
    /// Event length in fractional hours.
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_minutes() as f64 / 60.0
    }
}

/// Result of creating or updating a remote event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationReceipt {
    pub event_id: String,
    pub html_link: Option<String>,
}
