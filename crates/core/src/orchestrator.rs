//! Per-message orchestration
//!
//! Sequences the scheduling pipeline for one inbound message: classify,
//! require a connected calendar, extract a draft, resolve a time (slot search
//! when the extractor produced none), validate availability, then mutate.
//! Every terminal state maps to exactly one user-facing message shape; no
//! state is retried. The machine is re-entered fresh per message - the only
//! cross-message state is the explicit edit-session correlation.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use slated_domain::constants::MIN_MESSAGE_LEN;
use slated_domain::{
    BusyInterval, EventDraft, MutationReceipt, Result, SlatedError, UserCredential, WallTime,
    WorkWindow,
};
use tracing::{info, warn};

use crate::intent::{Intent, IntentClassifier};
use crate::ports::{CredentialStore, EventExtractor, ExtractionContext};
use crate::scheduling::availability::AvailabilityChecker;
use crate::scheduling::mutator::{EventMutator, UpdateFields};
use crate::scheduling::slot_finder::{SlotDecision, SlotFinder};
use crate::sessions::EditSessions;
use crate::time::derive_end_time;

/// Terminal outcome of one inbound message.
#[derive(Debug, Clone)]
pub enum BotOutcome {
    /// Non-scheduling chatter; answered with a canned response, no calendar
    /// access attempted.
    Rejected(Intent),
    /// No connected calendar; the response must include a path to connect.
    AwaitingConnection,
    ExtractionFailed { reason: String },
    /// Slot search exhausted the work window.
    NoFreeSlot { draft: EventDraft, busy: Vec<BusyInterval> },
    /// The requested window overlaps existing commitments.
    Conflict { draft: EventDraft, busy: Vec<BusyInterval> },
    AvailabilityFailed { reason: String },
    Created { draft: EventDraft, time: WallTime, end: WallTime, link: Option<String> },
    MutationFailed { reason: String },
}

/// Drives the scheduling state machine for each inbound message.
pub struct Orchestrator {
    classifier: IntentClassifier,
    credentials: Arc<dyn CredentialStore>,
    extractor: Arc<dyn EventExtractor>,
    slot_finder: SlotFinder,
    availability: AvailabilityChecker,
    mutator: EventMutator,
    sessions: Arc<EditSessions>,
    work_window: WorkWindow,
    timezone: String,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        extractor: Arc<dyn EventExtractor>,
        slot_finder: SlotFinder,
        availability: AvailabilityChecker,
        mutator: EventMutator,
        sessions: Arc<EditSessions>,
        work_window: WorkWindow,
        timezone: String,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            credentials,
            extractor,
            slot_finder,
            availability,
            mutator,
            sessions,
            work_window,
            timezone,
        }
    }

    /// Handle one inbound chat message.
    ///
    /// Recoverable failures become terminal [`BotOutcome`] variants; only
    /// unexpected errors (storage faults and the like) propagate as `Err` for
    /// the surface to log and answer with a generic apology.
    pub async fn handle_message(
        &self,
        user_id: &str,
        text: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<BotOutcome> {
        let text = text.trim();

        let intent = self.classifier.classify(text);
        if intent != Intent::SchedulingRequest {
            info!(user_id, ?intent, "message rejected before calendar access");
            return Ok(BotOutcome::Rejected(intent));
        }
        if text.len() < MIN_MESSAGE_LEN {
            return Ok(BotOutcome::Rejected(Intent::Ambiguous));
        }

        let Some(credential) = self.credentials.get(user_id).await? else {
            return Ok(BotOutcome::AwaitingConnection);
        };

        let ctx = ExtractionContext {
            timezone: self.timezone.clone(),
            work_hours: self.work_window,
            today: now.date_naive(),
        };
        let mut draft = match self.extractor.extract(text, &ctx).await {
            Ok(draft) => draft,
            Err(SlatedError::Extraction(reason)) => {
                warn!(user_id, %reason, "extraction failed");
                return Ok(BotOutcome::ExtractionFailed { reason });
            }
            Err(other) => return Err(other),
        };

        let time = match draft.time {
            Some(time) => time,
            None => {
                match self
                    .slot_finder
                    .find_free_slot(&credential, draft.date, draft.duration_hours, self.work_window)
                    .await
                {
                    Ok(SlotDecision::Free(slot)) => {
                        draft.time = Some(slot);
                        slot
                    }
                    Ok(SlotDecision::Exhausted(busy)) => {
                        return Ok(BotOutcome::NoFreeSlot { draft, busy });
                    }
                    Err(SlatedError::AvailabilityQuery(reason)) => {
                        return Ok(BotOutcome::AvailabilityFailed { reason });
                    }
                    Err(other) => return Err(other),
                }
            }
        };

        let end = derive_end_time(time, draft.duration_hours);
        let availability =
            match self.availability.check(&credential, draft.date, time, end).await {
                Ok(availability) => availability,
                Err(SlatedError::AvailabilityQuery(reason)) => {
                    return Ok(BotOutcome::AvailabilityFailed { reason });
                }
                Err(other) => return Err(other),
            };

        if !availability.available {
            info!(user_id, date = %draft.date, %time, "requested window conflicts");
            return Ok(BotOutcome::Conflict { draft, busy: availability.busy });
        }

        // The check above and the insert below are not one transaction: a
        // concurrent booking can take the slot in between. Accepted race.
        match self.mutator.create(&credential, &draft).await {
            Ok(receipt) => {
                Ok(BotOutcome::Created { draft, time, end, link: receipt.html_link })
            }
            Err(SlatedError::Mutation(reason)) => Ok(BotOutcome::MutationFailed { reason }),
            Err(other) => Err(other),
        }
    }

    /// Record that a user began editing an event from the widget.
    pub fn start_edit(&self, user_id: &str, event_id: &str) {
        self.sessions.start(user_id, event_id);
    }

    /// Apply an edit-session update. Requires a connected calendar and an
    /// active session.
    pub async fn submit_update(
        &self,
        user_id: &str,
        fields: &UpdateFields,
    ) -> Result<MutationReceipt> {
        let credential = self.require_credential(user_id).await?;
        self.mutator.update(&credential, user_id, fields).await
    }

    /// Delete a specific event on behalf of a user.
    pub async fn delete_event(&self, user_id: &str, event_id: &str) -> Result<()> {
        let credential = self.require_credential(user_id).await?;
        self.mutator.delete(&credential, event_id).await
    }

    async fn require_credential(&self, user_id: &str) -> Result<UserCredential> {
        self.credentials
            .get(user_id)
            .await?
            .ok_or_else(|| SlatedError::NotConnected(user_id.to_string()))
    }
}

impl BotOutcome {
    /// The user-facing text for this terminal state.
    pub fn message(&self) -> String {
        match self {
            Self::Rejected(Intent::Greeting) => {
                "Hello! I can help you manage your calendar. Try \"Schedule a meeting tomorrow at 3 PM\".".into()
            }
            Self::Rejected(Intent::Gratitude) => "You're welcome! Happy to help.".into(),
            Self::Rejected(Intent::SmallTalk) => {
                "I'm your scheduling assistant. I can create, move, and delete calendar events - just describe what you need.".into()
            }
            Self::Rejected(_) => {
                "That doesn't look like a scheduling request. Try \"Schedule a meeting tomorrow at 3 PM\" or \"Block 2 hours Friday for project work\".".into()
            }
            Self::AwaitingConnection => {
                "**Please connect your Google Calendar first!**\n\nI need access to your calendar to check availability and create events. Use the connect link to get started.".into()
            }
            Self::ExtractionFailed { reason } => format!(
                "I couldn't understand that. Please try:\n\n\
                 - \"Schedule meeting with team tomorrow at 3 PM\"\n\
                 - \"Block 2 hours Friday afternoon for project work\"\n\
                 - \"Remind me to submit report by next Monday\"\n\n\
                 Error: {reason}"
            ),
            Self::NoFreeSlot { draft, busy } => {
                let mut msg = format!(
                    "No free {}h slot left on {} within working hours.",
                    draft.duration_hours, draft.date
                );
                if !busy.is_empty() {
                    msg.push_str("\n\nBusy slots:\n");
                    msg.push_str(&format_busy(busy));
                }
                msg.push_str("\n\nTry another day, or a shorter duration.");
                msg
            }
            Self::Conflict { draft, busy } => {
                let time = draft
                    .time
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "that time".to_string());
                format!(
                    "**Time Slot Conflict!**\n\nYou already have something scheduled at {} on {}.\n\nBusy slots:\n{}\n\nWould you like to choose a different time?",
                    time,
                    draft.date,
                    format_busy(busy)
                )
            }
            Self::AvailabilityFailed { reason } => {
                format!("Could not check your calendar: {reason}")
            }
            Self::Created { draft, time, end, link } => {
                let mut msg = format!(
                    "**Event Created!**\n\n{}\n{} from {} to {}",
                    draft.title, draft.date, time, end
                );
                if let Some(link) = link {
                    msg.push_str(&format!("\n\n[View in Calendar]({link})"));
                }
                msg
            }
            Self::MutationFailed { reason } => format!("Failed to create event: {reason}"),
        }
    }
}

/// Render busy intervals as local-formatted start/end lines so the user can
/// pick around them.
fn format_busy(busy: &[BusyInterval]) -> String {
    busy.iter()
        .map(|interval| {
            format!(
                "- {} - {}",
                interval.start.format("%H:%M"),
                interval.end.format("%H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
