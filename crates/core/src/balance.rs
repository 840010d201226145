//! Work-life balance analysis
//!
//! Pure aggregation over a week of calendar events: classifies hours as
//! in-window work or overtime, counts meetings and focus blocks by title,
//! averages sleep-tagged events, and scores the week 0-100 against fixed
//! thresholds.

use slated_domain::{BalancePreferences, BalanceReport, CalendarEvent};

const MEETING_MARKERS: &[&str] = &["meeting", "call", "sync"];
const FOCUS_MARKERS: &[&str] = &["focus", "deep work", "coding"];
const SLEEP_MARKERS: &[&str] = &["sleep", "bedtime"];

/// Analyze one week of events against the user's preferences.
pub fn analyze(events: &[CalendarEvent], prefs: &BalancePreferences) -> BalanceReport {
    let mut report = BalanceReport::default();

    for event in events {
        let duration = event.duration_hours();
        let title = event.title.to_lowercase();
        let start_hour = chrono::Timelike::hour(&event.start);

        if start_hour >= prefs.work_start_hour && start_hour < prefs.work_end_hour {
            report.work_hours += duration;
            if MEETING_MARKERS.iter().any(|m| title.contains(m)) {
                report.meetings_count += 1;
            }
        } else {
            report.overtime_hours += duration;
        }

        if FOCUS_MARKERS.iter().any(|m| title.contains(m)) {
            report.focus_time_hours += duration;
        }
    }

    let sleep_events: Vec<&CalendarEvent> = events
        .iter()
        .filter(|e| {
            let title = e.title.to_lowercase();
            SLEEP_MARKERS.iter().any(|m| title.contains(m))
        })
        .collect();

    report.avg_sleep_hours = if sleep_events.is_empty() {
        prefs.target_sleep_hours
    } else {
        let total: f64 = sleep_events.iter().map(|e| e.duration_hours()).sum();
        total / sleep_events.len() as f64
    };

    collect_issues(&mut report, prefs);
    collect_recommendations(&mut report, prefs);
    report.score = score(&report, prefs);

    if report.issues.is_empty() {
        report.recommendations.push("Great balance! Keep maintaining this schedule".into());
        report.recommendations.push("Continue prioritizing sleep and focus time".into());
    }

    report
}

fn collect_issues(report: &mut BalanceReport, prefs: &BalancePreferences) {
    if report.work_hours > 45.0 {
        report.issues.push(format!(
            "Working {} hours (recommended: max 40)",
            report.work_hours.round()
        ));
    }
    if report.meetings_count > 15 {
        report
            .issues
            .push(format!("{} meetings this week (recommended: max 12)", report.meetings_count));
    }
    if report.focus_time_hours < 10.0 {
        report.issues.push(format!(
            "Only {} hours of focus time (recommended: 15+)",
            report.focus_time_hours.round()
        ));
    }
    if report.overtime_hours > 5.0 {
        report.issues.push(format!("{} hours of overtime work", report.overtime_hours.round()));
    }
    if report.avg_sleep_hours < prefs.target_sleep_hours {
        report.issues.push(format!(
            "Average {:.1} hours sleep (target: {})",
            report.avg_sleep_hours, prefs.target_sleep_hours
        ));
    }
}

fn collect_recommendations(report: &mut BalanceReport, prefs: &BalancePreferences) {
    if report.meetings_count > 12 {
        report
            .recommendations
            .push("Consider declining optional meetings or combining similar ones".into());
    }
    if report.focus_time_hours < 15.0 {
        report
            .recommendations
            .push("Block 2-3 hour focus time sessions daily for deep work".into());
    }
    if report.work_hours > 40.0 {
        report.recommendations.push("Try to limit work to 8 hours per day maximum".into());
    }
    if report.overtime_hours > 3.0 {
        report.recommendations.push("Avoid scheduling work outside 9 AM - 6 PM".into());
    }
    if report.avg_sleep_hours < prefs.target_sleep_hours {
        report
            .recommendations
            .push("Schedule consistent sleep times: aim for 7-8 hours nightly".into());
    }
    if report.meetings_count > 0 && report.focus_time_hours == 0.0 {
        report.recommendations.push("Balance meetings with dedicated focus time blocks".into());
    }
}

/// Penalty weights: -2/hour worked over 40, -3/meeting over 12, -2/missing
/// focus hour under 15, -5/overtime hour, -10/sleep hour under target.
fn score(report: &BalanceReport, prefs: &BalancePreferences) -> u32 {
    let mut score = 100.0;
    score -= ((report.work_hours - 40.0) * 2.0).max(0.0);
    score -= ((report.meetings_count as f64 - 12.0) * 3.0).max(0.0);
    score -= ((15.0 - report.focus_time_hours) * 2.0).max(0.0);
    score -= report.overtime_hours * 5.0;
    score -= ((prefs.target_sleep_hours - report.avg_sleep_hours) * 10.0).max(0.0);
    score.round().clamp(0.0, 100.0) as u32
}
