//! Slash-command handlers: day/week schedule queries, delete-by-description,
//! and the weekly balance report.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate};
use slated_domain::{
    BalancePreferences, BalanceReport, CalendarEvent, Result, SlatedError, WorkWindow,
};
use tracing::{info, warn};

use crate::ports::{CalendarPort, CredentialStore, EventExtractor, ExtractionContext};

/// Terminal outcome of a slash command.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    AwaitingConnection,
    DaySchedule { date: NaiveDate, events: Vec<CalendarEvent> },
    WeekSchedule { events: Vec<CalendarEvent> },
    Deleted { event: CalendarEvent },
    DeleteNotFound { date: NaiveDate, candidates: Vec<CalendarEvent> },
    DeleteUsage,
    ExtractionFailed { reason: String },
    Balance(BalanceReport),
    Failed { reason: String },
}

/// Handles the `/today`, `/week`, `/delete`, and `/balance` commands.
pub struct CommandService {
    credentials: Arc<dyn CredentialStore>,
    calendar: Arc<dyn CalendarPort>,
    extractor: Arc<dyn EventExtractor>,
    work_window: WorkWindow,
    timezone: String,
}

impl CommandService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        calendar: Arc<dyn CalendarPort>,
        extractor: Arc<dyn EventExtractor>,
        work_window: WorkWindow,
        timezone: String,
    ) -> Self {
        Self { credentials, calendar, extractor, work_window, timezone }
    }

    /// List today's events, ordered by start time.
    pub async fn today(
        &self,
        user_id: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<CommandOutcome> {
        let Some(credential) = self.credentials.get(user_id).await? else {
            return Ok(CommandOutcome::AwaitingConnection);
        };

        let date = now.date_naive();
        let events =
            match self.calendar.list_events(&credential, day_start(date), day_end(date)).await {
                Ok(events) => events,
                Err(e) => return Ok(CommandOutcome::Failed { reason: e.to_string() }),
            };
        Ok(CommandOutcome::DaySchedule { date, events })
    }

    /// List this week's events (Sunday through Saturday).
    pub async fn week(&self, user_id: &str, now: DateTime<FixedOffset>) -> Result<CommandOutcome> {
        let Some(credential) = self.credentials.get(user_id).await? else {
            return Ok(CommandOutcome::AwaitingConnection);
        };

        let today = now.date_naive();
        let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
        let window_start = day_start(week_start);
        let window_end = window_start + Duration::days(7);

        let events = match self.calendar.list_events(&credential, window_start, window_end).await {
            Ok(events) => events,
            Err(e) => return Ok(CommandOutcome::Failed { reason: e.to_string() }),
        };
        Ok(CommandOutcome::WeekSchedule { events })
    }

    /// Delete the event described by free text: extract a draft, list that
    /// day's events, and remove the first whose title contains the extracted
    /// title (tie-broken by start time when one was extracted).
    pub async fn delete(
        &self,
        user_id: &str,
        args: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<CommandOutcome> {
        let Some(credential) = self.credentials.get(user_id).await? else {
            return Ok(CommandOutcome::AwaitingConnection);
        };

        let args = args.trim();
        if args.is_empty() {
            return Ok(CommandOutcome::DeleteUsage);
        }

        let ctx = ExtractionContext {
            timezone: self.timezone.clone(),
            work_hours: self.work_window,
            today: now.date_naive(),
        };
        let draft = match self.extractor.extract(args, &ctx).await {
            Ok(draft) => draft,
            Err(SlatedError::Extraction(reason)) => {
                return Ok(CommandOutcome::ExtractionFailed { reason });
            }
            Err(other) => return Err(other),
        };

        let events = match self
            .calendar
            .list_events(&credential, day_start(draft.date), day_end(draft.date))
            .await
        {
            Ok(events) => events,
            Err(e) => return Ok(CommandOutcome::Failed { reason: e.to_string() }),
        };

        let Some(target) = match_event(&events, &draft.title, draft.time) else {
            warn!(user_id, date = %draft.date, title = %draft.title, "no matching event to delete");
            return Ok(CommandOutcome::DeleteNotFound { date: draft.date, candidates: events });
        };

        match self.calendar.delete_event(&credential, &target.id).await {
            Ok(()) => {
                info!(user_id, event_id = %target.id, "event deleted");
                Ok(CommandOutcome::Deleted { event: target })
            }
            Err(e) => Ok(CommandOutcome::Failed { reason: e.to_string() }),
        }
    }

    /// Analyze the last seven days of events.
    pub async fn balance(
        &self,
        user_id: &str,
        now: DateTime<FixedOffset>,
        prefs: &BalancePreferences,
    ) -> Result<CommandOutcome> {
        let Some(credential) = self.credentials.get(user_id).await? else {
            return Ok(CommandOutcome::AwaitingConnection);
        };

        let today = now.date_naive();
        let window_start = day_start(today - Duration::days(7));
        let window_end = day_end(today);

        let events = match self.calendar.list_events(&credential, window_start, window_end).await {
            Ok(events) => events,
            Err(e) => return Ok(CommandOutcome::Failed { reason: e.to_string() }),
        };

        Ok(CommandOutcome::Balance(crate::balance::analyze(&events, prefs)))
    }
}

/// First event whose title contains `title` case-insensitively. When a start
/// time was extracted and the first title match starts elsewhere, prefer a
/// match on both title and time.
fn match_event(
    events: &[CalendarEvent],
    title: &str,
    time: Option<slated_domain::WallTime>,
) -> Option<CalendarEvent> {
    let needle = title.to_lowercase();
    let by_title = events.iter().find(|e| e.title.to_lowercase().contains(&needle))?;

    if let Some(want) = time {
        let starts_at = |e: &CalendarEvent| {
            chrono::Timelike::hour(&e.start) == want.hour
                && chrono::Timelike::minute(&e.start) == want.minute
        };
        if !starts_at(by_title) {
            if let Some(exact) = events
                .iter()
                .find(|e| starts_at(e) && e.title.to_lowercase().contains(&needle))
            {
                return Some(exact.clone());
            }
        }
    }

    Some(by_title.clone())
}

fn day_start(date: NaiveDate) -> DateTime<FixedOffset> {
    slated_domain::WallTime { hour: 0, minute: 0 }.on(date)
}

fn day_end(date: NaiveDate) -> DateTime<FixedOffset> {
    // End-of-day boundary; list windows are inclusive enough at minute
    // precision for schedule rendering.
    slated_domain::WallTime { hour: 23, minute: 59 }.on(date)
}

impl CommandOutcome {
    /// The user-facing text for this outcome.
    pub fn message(&self) -> String {
        match self {
            Self::AwaitingConnection => {
                "Please connect your Google Calendar first! Use /connect to get started.".into()
            }
            Self::DaySchedule { date, events } => render_day(*date, events),
            Self::WeekSchedule { events } => render_week(events),
            Self::Deleted { event } => format!(
                "**Event Deleted Successfully!**\n\nDeleted: **{}**\nTime: {}",
                event.title,
                event.start.format("%A, %B %-d at %H:%M")
            ),
            Self::DeleteNotFound { date, candidates } => {
                let listing = candidates
                    .iter()
                    .enumerate()
                    .map(|(i, e)| {
                        format!("{}. **{}** at {}", i + 1, e.title, e.start.format("%H:%M"))
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                if listing.is_empty() {
                    format!("No events found on {date}")
                } else {
                    format!(
                        "Couldn't find a matching event.\n\n**Events on {date}:**\n{listing}\n\nTry: `/delete [exact event name] at [time]`"
                    )
                }
            }
            Self::DeleteUsage => "Please specify what to delete.\n\n\
                **Examples:**\n\
                - `/delete meeting tomorrow at 3 PM`\n\
                - `/delete team standup on Friday`"
                .into(),
            Self::ExtractionFailed { .. } => {
                "I couldn't understand which event you mean.\n\nPlease be more specific about the date and time.".into()
            }
            Self::Balance(report) => render_balance(report),
            Self::Failed { reason } => format!("Could not complete that: {reason}"),
        }
    }
}

fn render_day(date: NaiveDate, events: &[CalendarEvent]) -> String {
    let header = format!("**Today's Schedule** - {}", date.format("%A, %b %-d"));
    if events.is_empty() {
        return format!(
            "{header}\n\nNo events scheduled today!\n\nPerfect day for deep work or catching up on tasks."
        );
    }
    let lines = events
        .iter()
        .map(|e| {
            format!("- **{}** - {} ({}h)", e.start.format("%H:%M"), e.title, e.duration_hours())
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{header}\n\n{lines}\n\nTotal: {} event{}",
        events.len(),
        if events.len() > 1 { "s" } else { "" }
    )
}

fn render_week(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return "**This Week's Schedule**\n\nNo events scheduled this week!".into();
    }

    let mut out = String::from("**This Week's Schedule**\n\n");
    let mut current_day: Option<NaiveDate> = None;
    for event in events {
        let day = event.start.date_naive();
        if current_day != Some(day) {
            out.push_str(&format!("**{}**\n", day.format("%a, %b %-d")));
            current_day = Some(day);
        }
        out.push_str(&format!("  - {} - {}\n", event.start.format("%H:%M"), event.title));
    }
    out.push_str(&format!(
        "\nTotal: {} event{} this week",
        events.len(),
        if events.len() > 1 { "s" } else { "" }
    ));
    out
}

fn render_balance(report: &BalanceReport) -> String {
    let mut out = format!(
        "**Work-Life Balance Report**\n\nScore: {}/100\n\n**This Week:**\n\
         Work Hours: {} hours\nMeetings: {}\nFocus Time: {} hours\nAvg Sleep: {:.1} hours\n",
        report.score,
        report.work_hours.round(),
        report.meetings_count,
        report.focus_time_hours.round(),
        report.avg_sleep_hours
    );
    if !report.issues.is_empty() {
        out.push_str(&format!("\n**Issues Found:** {}\n", report.issues.len()));
        for issue in &report.issues {
            out.push_str(&format!("- {issue}\n"));
        }
    }
    if !report.recommendations.is_empty() {
        out.push_str(&format!("\n**Recommendations:** {}\n", report.recommendations.len()));
        for rec in &report.recommendations {
            out.push_str(&format!("- {rec}\n"));
        }
    }
    out
}
