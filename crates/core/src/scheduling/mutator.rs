//! Event mutation - create, update, delete against the calendar port
//!
//! Translates a resolved draft into a provider event body. End time is always
//! derived from start + duration (clamped to 23:59), never supplied
//! independently. Reminders are fixed at 30 and 10 minutes before start.

use std::sync::Arc;

use chrono::NaiveDate;
use slated_domain::constants::REMINDER_MINUTES;
use slated_domain::{EventDraft, MutationReceipt, Result, SlatedError, UserCredential, WallTime};
use tracing::{info, warn};

use crate::ports::{CalendarPort, EventBody};
use crate::sessions::EditSessions;
use crate::time::derive_end_time;

/// Fields accepted by an edit-session update. End time is derived here, the
/// same as on create.
#[derive(Debug, Clone)]
pub struct UpdateFields {
    pub title: String,
    pub date: NaiveDate,
    pub time: WallTime,
    pub duration_hours: f64,
}

/// Creates, updates, and deletes remote calendar events.
pub struct EventMutator {
    calendar: Arc<dyn CalendarPort>,
    sessions: Arc<EditSessions>,
}

impl EventMutator {
    pub fn new(calendar: Arc<dyn CalendarPort>, sessions: Arc<EditSessions>) -> Self {
        Self { calendar, sessions }
    }

    /// Create an event from a fully resolved draft. The draft must carry a
    /// concrete time; slot search resolves it before this point.
    pub async fn create(
        &self,
        credential: &UserCredential,
        draft: &EventDraft,
    ) -> Result<MutationReceipt> {
        let time = draft.time.ok_or_else(|| {
            SlatedError::Internal("draft reached the mutator without a start time".into())
        })?;

        let body = build_event_body(
            &draft.title,
            &draft.description,
            draft.date,
            time,
            draft.duration_hours,
            &draft.participants,
        );

        info!(title = %draft.title, date = %draft.date, time = %time, "creating calendar event");
        self.calendar.insert_event(credential, &body).await.map_err(as_mutation)
    }

    /// Update the event the user started editing. The event id comes from the
    /// active edit session; a missing session is a user-facing "session
    /// expired" error, never a silent no-op. The session is cleared only
    /// after the provider confirms the update.
    pub async fn update(
        &self,
        credential: &UserCredential,
        user_id: &str,
        fields: &UpdateFields,
    ) -> Result<MutationReceipt> {
        let event_id = self
            .sessions
            .resolve(user_id)
            .ok_or_else(|| SlatedError::SessionExpired(user_id.to_string()))?;

        let body = build_event_body(
            &fields.title,
            "",
            fields.date,
            fields.time,
            fields.duration_hours,
            &[],
        );

        info!(%event_id, user_id, "updating calendar event");
        let receipt =
            self.calendar.update_event(credential, &event_id, &body).await.map_err(as_mutation)?;
        self.sessions.clear(user_id);
        Ok(receipt)
    }

    /// Delete a remote event by id.
    pub async fn delete(&self, credential: &UserCredential, event_id: &str) -> Result<()> {
        info!(%event_id, "deleting calendar event");
        self.calendar.delete_event(credential, event_id).await.map_err(as_mutation)
    }
}

/// Build the provider-facing event body: derived end time, fixed reminders,
/// attendees filtered down to plausible email addresses.
pub fn build_event_body(
    title: &str,
    description: &str,
    date: NaiveDate,
    time: WallTime,
    duration_hours: f64,
    participants: &[String],
) -> EventBody {
    let end = derive_end_time(time, duration_hours);

    let attendees: Vec<String> = participants
        .iter()
        .filter(|p| {
            let keep = is_plausible_email(p);
            if !keep {
                warn!(participant = %p, "dropping participant without a plausible email");
            }
            keep
        })
        .map(|p| p.trim().to_string())
        .collect();

    EventBody {
        summary: title.to_string(),
        description: description.to_string(),
        start: time.on(date),
        end: end.on(date),
        attendees,
        reminder_minutes: REMINDER_MINUTES.to_vec(),
    }
}

/// Syntactic plausibility only: one `@`, a non-empty local part, a dotted
/// domain, no whitespace. A malformed participant name must never become an
/// invalid invite.
fn is_plausible_email(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    if trimmed.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn as_mutation(err: SlatedError) -> SlatedError {
    match err {
        SlatedError::Mutation(_) => err,
        other => SlatedError::Mutation(other.to_string()),
    }
}
