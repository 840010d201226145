//! Chat-completions wire types and the raw draft shape the model returns.

use serde::{Deserialize, Serialize};
use slated_domain::{EventDraft, EventType, Priority, Result, SlatedError, WallTime};

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Draft exactly as the model emits it: everything optional, nothing trusted.
#[derive(Debug, Default, Deserialize)]
pub struct RawEventDraft {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<f64>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub priority: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    pub description: Option<String>,
    pub flexible: Option<bool>,
}

impl RawEventDraft {
    /// Validate into a domain draft. A draft without both a title and a date
    /// is an extraction failure regardless of what the provider claimed.
    pub fn into_draft(self) -> Result<EventDraft> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SlatedError::Extraction("missing required field: title".into()))?;

        let date = self
            .date
            .as_deref()
            .and_then(|d| d.parse::<chrono::NaiveDate>().ok())
            .ok_or_else(|| {
                SlatedError::Extraction("missing or invalid required field: date".into())
            })?;

        // A malformed time is treated as absent; slot search will resolve it.
        let time = self.time.as_deref().and_then(|t| t.parse::<WallTime>().ok());

        let duration_hours = match self.duration {
            Some(d) if d > 0.0 => d,
            _ => 1.0,
        };

        Ok(EventDraft {
            title,
            date,
            time,
            duration_hours,
            event_type: parse_event_type(self.event_type.as_deref()),
            priority: parse_priority(self.priority.as_deref()),
            participants: self.participants,
            description: self.description.unwrap_or_default(),
            flexible: self.flexible.unwrap_or(false),
        })
    }
}

fn parse_event_type(raw: Option<&str>) -> EventType {
    match raw.map(str::to_lowercase).as_deref() {
        Some("task") => EventType::Task,
        Some("focus_block") => EventType::FocusBlock,
        Some("reminder") => EventType::Reminder,
        _ => EventType::Meeting,
    }
}

fn parse_priority(raw: Option<&str>) -> Priority {
    match raw.map(str::to_lowercase).as_deref() {
        Some("low") => Priority::Low,
        Some("high") => Priority::High,
        Some("urgent") => Priority::Urgent,
        _ => Priority::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_title_or_date_fails_validation() {
        let raw = RawEventDraft { date: Some("2025-06-02".into()), ..Default::default() };
        assert!(matches!(raw.into_draft(), Err(SlatedError::Extraction(_))));

        let raw = RawEventDraft { title: Some("Sync".into()), ..Default::default() };
        assert!(matches!(raw.into_draft(), Err(SlatedError::Extraction(_))));

        let raw = RawEventDraft {
            title: Some("  ".into()),
            date: Some("2025-06-02".into()),
            ..Default::default()
        };
        assert!(matches!(raw.into_draft(), Err(SlatedError::Extraction(_))));
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let raw = RawEventDraft {
            title: Some("Sync".into()),
            date: Some("2025-06-02".into()),
            ..Default::default()
        };
        let draft = raw.into_draft().unwrap();
        assert_eq!(draft.time, None);
        assert_eq!(draft.duration_hours, 1.0);
        assert_eq!(draft.event_type, EventType::Meeting);
        assert_eq!(draft.priority, Priority::Medium);
        assert!(!draft.flexible);
    }

    #[test]
    fn malformed_time_is_treated_as_absent() {
        let raw = RawEventDraft {
            title: Some("Sync".into()),
            date: Some("2025-06-02".into()),
            time: Some("half past nine".into()),
            ..Default::default()
        };
        assert_eq!(raw.into_draft().unwrap().time, None);
    }
}
