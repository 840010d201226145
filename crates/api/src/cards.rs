//! Card and widget JSON rendering
//!
//! Presentation-only translation of core outcomes into the chat platform's
//! card/widget payloads. Anything the platform cannot render as a card falls
//! back to a plain `{text}` payload.

use chrono::{DateTime, FixedOffset};
use serde_json::{json, Value};
use slated_core::BotOutcome;
use slated_domain::CalendarEvent;

/// Render a bot outcome: a rich card for successful creation, plain text for
/// every other terminal state.
pub fn render_bot_outcome(outcome: &BotOutcome) -> Value {
    match outcome {
        BotOutcome::Created { draft, time, end, link } => {
            let mut elements = vec![
                json!({"type": "text", "text": format!("**Date:** {}", draft.date.format("%A, %B %-d, %Y"))}),
                json!({"type": "text", "text": format!("**Time:** {time} - {end}")}),
                json!({"type": "text", "text": format!("**Duration:** {} hour{}", draft.duration_hours, if draft.duration_hours > 1.0 { "s" } else { "" })}),
                json!({"type": "text", "text": "Reminders set for 30 and 10 minutes before"}),
            ];
            if let Some(link) = link {
                elements.push(json!({"type": "text", "text": format!("[View in Calendar]({link})")}));
            }
            json!({
                "text": "Event Created Successfully!",
                "card": {
                    "theme": "modern-inline",
                    "title": draft.title,
                    "sections": [{"id": 1, "elements": elements}]
                }
            })
        }
        other => json!({"text": other.message()}),
    }
}

/// Build the "today" widget: summary stats plus one section per task with
/// edit/delete buttons. Event ids ride in the button ids (`edit_<id>`,
/// `del_<id>`) so the widget callback can start an edit session.
pub fn today_widget(events: &[CalendarEvent], now: DateTime<FixedOffset>) -> Value {
    let completed = events.iter().filter(|e| e.end < now).count();
    let in_progress = events.iter().filter(|e| e.start <= now && e.end >= now).count();
    let upcoming = events.len() - completed - in_progress;

    let mut sections = vec![json!({
        "id": 1,
        "elements": [
            {"type": "title", "text": "Today's Summary"},
            {"type": "text", "text": format!(
                "Completed: **{completed}** | In Progress: **{in_progress}** | Upcoming: **{upcoming}**"
            )},
            {"type": "divider"}
        ]
    })];

    if events.is_empty() {
        sections.push(json!({
            "id": 2,
            "elements": [{"type": "text", "text": "**No tasks scheduled for today!**"}]
        }));
    } else {
        sections.push(json!({
            "id": 2,
            "elements": [{"type": "title", "text": format!("All Tasks ({})", events.len())}]
        }));
        for (idx, event) in events.iter().enumerate() {
            let status = if event.end < now {
                "Completed"
            } else if event.start <= now {
                "In Progress"
            } else {
                "Upcoming"
            };
            sections.push(json!({
                "id": idx + 3,
                "elements": [
                    {"type": "text", "text": format!(
                        "**{}**\n{} - {} ({}h) - _{}_",
                        event.title,
                        event.start.format("%H:%M"),
                        event.end.format("%H:%M"),
                        event.duration_hours(),
                        status
                    )},
                    {"type": "buttons", "buttons": [
                        {
                            "label": "Edit",
                            "type": "invoke.function",
                            "name": "editTaskFromWidget",
                            "id": format!("edit_{}", event.id)
                        },
                        {
                            "label": "Delete",
                            "type": "invoke.function",
                            "name": "deleteTaskFromWidget",
                            "id": format!("del_{}", event.id),
                            "emotion": "negative"
                        }
                    ]},
                    {"type": "divider"}
                ]
            }));
        }
    }

    json!({
        "type": "applet",
        "tabs": [{"label": "Today's Tasks", "id": "overview"}],
        "active_tab": "overview",
        "sections": sections,
        "header": {
            "title": format!("Today - {}", now.format("%b %-d")),
            "navigation": "new"
        }
    })
}

/// Error widget shown when the calendar cannot be loaded.
pub fn error_widget(message: &str) -> Value {
    json!({
        "type": "applet",
        "data_type": "info",
        "info": {
            "title": "Tasks Widget Error",
            "description": message,
            "button": {
                "label": "Connect Calendar",
                "type": "invoke.function",
                "name": "connectCalendar",
                "id": "connect_btn"
            }
        },
        "tabs": [{"label": "Error", "id": "error_tab"}],
        "active_tab": "error_tab"
    })
}
