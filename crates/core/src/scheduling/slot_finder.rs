//! Free-slot search
//!
//! Greedy earliest-fit over a half-hour-aligned candidate grid. Used when the
//! extractor produced a draft without a concrete time; the user's intent is
//! "soonest available", not an optimally packed schedule.

use std::sync::Arc;

use chrono::NaiveDate;
use slated_domain::{BusyInterval, Result, SlatedError, UserCredential, WallTime, WorkWindow};
use tracing::debug;

use crate::ports::CalendarPort;
use crate::time::{candidate_starts, duration_minutes};

/// Result of a slot search.
#[derive(Debug, Clone)]
pub enum SlotDecision {
    /// Earliest conflict-free start time.
    Free(WallTime),
    /// Every candidate overlapped something (or the duration does not fit in
    /// the window). Carries the busy intervals fetched for the window so the
    /// caller can report them.
    Exhausted(Vec<BusyInterval>),
}

/// Searches for a conflict-free start time within the work window.
pub struct SlotFinder {
    calendar: Arc<dyn CalendarPort>,
}

impl SlotFinder {
    pub fn new(calendar: Arc<dyn CalendarPort>) -> Self {
        Self { calendar }
    }

    /// Find the earliest free slot of `duration_hours` on `date`.
    ///
    /// Fetches all busy intervals for the full work window in one query, then
    /// accepts the first half-hour-aligned candidate whose `[start, end)`
    /// interval overlaps nothing under the strict half-open test. Repeated
    /// calls with identical busy data return the same candidate.
    pub async fn find_free_slot(
        &self,
        credential: &UserCredential,
        date: NaiveDate,
        duration_hours: f64,
        window: WorkWindow,
    ) -> Result<SlotDecision> {
        let candidates = candidate_starts(window, duration_hours);
        if candidates.is_empty() {
            debug!(%window, duration_hours, "duration does not fit in work window");
            return Ok(SlotDecision::Exhausted(Vec::new()));
        }

        let busy = self
            .calendar
            .query_busy(credential, window.start.on(date), window.end.on(date))
            .await
            .map_err(|e| SlatedError::AvailabilityQuery(e.to_string()))?;

        let needed = duration_minutes(duration_hours);
        for candidate in candidates {
            let start = candidate.on(date);
            // Candidates are bounded so start + duration stays inside the
            // window; no clamping can occur here.
            let end = start + chrono::Duration::minutes(i64::from(needed));
            if !busy.iter().any(|interval| interval.overlaps(start, end)) {
                debug!(slot = %candidate, %date, "found free slot");
                return Ok(SlotDecision::Free(candidate));
            }
        }

        debug!(%date, busy_count = busy.len(), "no free slot in work window");
        Ok(SlotDecision::Exhausted(busy))
    }
}
