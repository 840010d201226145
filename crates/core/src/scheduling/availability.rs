//! Availability validation for one specific candidate window
//!
//! Where the slot finder searches for *a* slot, this checker validates *one*
//! already-chosen window immediately before mutation, narrowing the race
//! between proposal and commit. A query failure is surfaced as a failure; it
//! is never read as "busy", and the caller must not mutate on an unknown
//! availability state.

use std::sync::Arc;

use chrono::NaiveDate;
use slated_domain::{BusyInterval, Result, SlatedError, UserCredential, WallTime};

use crate::ports::CalendarPort;

/// Outcome of an availability check.
#[derive(Debug, Clone)]
pub struct Availability {
    pub available: bool,
    pub busy: Vec<BusyInterval>,
}

/// Validates a specific `[start, end)` window against the calendar.
pub struct AvailabilityChecker {
    calendar: Arc<dyn CalendarPort>,
}

impl AvailabilityChecker {
    pub fn new(calendar: Arc<dyn CalendarPort>) -> Self {
        Self { calendar }
    }

    /// Query busy intervals for exactly the requested window. Available iff
    /// the provider reports zero busy intervals inside it.
    pub async fn check(
        &self,
        credential: &UserCredential,
        date: NaiveDate,
        start: WallTime,
        end: WallTime,
    ) -> Result<Availability> {
        let busy = self
            .calendar
            .query_busy(credential, start.on(date), end.on(date))
            .await
            .map_err(|e| SlatedError::AvailabilityQuery(e.to_string()))?;

        Ok(Availability { available: busy.is_empty(), busy })
    }
}
