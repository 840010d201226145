//! Wall-clock arithmetic for the scheduling engine.

use slated_domain::{WallTime, WorkWindow};

use slated_domain::constants::SLOT_GRID_MINUTES;

/// Duration in whole minutes, floored the way end-time derivation splits a
/// fractional hour count into hours + minutes.
pub fn duration_minutes(duration_hours: f64) -> u32 {
    let hours = duration_hours.floor();
    let minutes = ((duration_hours - hours) * 60.0).floor();
    (hours as u32) * 60 + minutes as u32
}

/// Derive an event's end time from its start and duration.
///
/// The result is clamped to 23:59 rather than rolling into the next day, so a
/// late-evening long-duration event never silently lands on the following
/// date.
pub fn derive_end_time(start: WallTime, duration_hours: f64) -> WallTime {
    let total = start.minutes_from_midnight() + duration_minutes(duration_hours);
    if total >= 24 * 60 {
        return WallTime { hour: 23, minute: 59 };
    }
    WallTime { hour: total / 60, minute: total % 60 }
}

/// Half-hour-aligned candidate start times from work-start up to
/// `work-end - duration` inclusive, in ascending order.
///
/// The grid itself stays half-hour aligned even for durations that are not a
/// whole number of half-hour units, so off-grid free windows are never
/// considered. Known approximation.
pub fn candidate_starts(window: WorkWindow, duration_hours: f64) -> Vec<WallTime> {
    let start = window.start.minutes_from_midnight();
    let end = window.end.minutes_from_midnight();
    let needed = duration_minutes(duration_hours);

    if needed == 0 || needed > end.saturating_sub(start) {
        return Vec::new();
    }

    let latest = end - needed;
    (start..=latest)
        .step_by(SLOT_GRID_MINUTES as usize)
        .map(|minutes| WallTime { hour: minutes / 60, minute: minutes % 60 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wt(h: u32, m: u32) -> WallTime {
        WallTime { hour: h, minute: m }
    }

    #[test]
    fn derives_simple_end_times() {
        assert_eq!(derive_end_time(wt(9, 0), 1.0), wt(10, 0));
        assert_eq!(derive_end_time(wt(9, 30), 1.5), wt(11, 0));
        assert_eq!(derive_end_time(wt(14, 15), 0.75), wt(15, 0));
    }

    #[test]
    fn minute_overflow_carries_into_hours() {
        assert_eq!(derive_end_time(wt(9, 45), 0.5), wt(10, 15));
        assert_eq!(derive_end_time(wt(10, 40), 1.5), wt(12, 10));
    }

    #[test]
    fn late_events_clamp_to_end_of_day() {
        // 22:30 + 2h would be 00:30 next day; policy clamps instead.
        assert_eq!(derive_end_time(wt(22, 30), 2.0), wt(23, 59));
        assert_eq!(derive_end_time(wt(23, 0), 8.0), wt(23, 59));
    }

    #[test]
    fn end_never_precedes_start_within_the_day() {
        for hour in 0..24 {
            for &duration in &[0.5, 1.0, 2.5] {
                let start = wt(hour, 0);
                let end = derive_end_time(start, duration);
                assert!(end >= start, "start {start} duration {duration}");
                assert!(end <= wt(23, 59));
            }
        }
    }

    #[test]
    fn grid_spans_window_inclusive_of_latest_fit() {
        let window = WorkWindow::parse("09:00-18:00").unwrap();
        let grid = candidate_starts(window, 1.0);
        assert_eq!(grid.first(), Some(&wt(9, 0)));
        // Latest 1h slot starts at 17:00.
        assert_eq!(grid.last(), Some(&wt(17, 0)));
        assert_eq!(grid.len(), 17);
    }

    #[test]
    fn oversized_duration_yields_empty_grid() {
        let window = WorkWindow::parse("09:00-18:00").unwrap();
        assert!(candidate_starts(window, 10.0).is_empty());
        assert!(candidate_starts(window, 9.5).is_empty());
        // Exactly the window length still fits, once.
        assert_eq!(candidate_starts(window, 9.0), vec![wt(9, 0)]);
    }
}
