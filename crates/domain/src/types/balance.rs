//! Work-life balance report produced by the weekly analysis.

use serde::{Deserialize, Serialize};

/// Aggregated view of one week of calendar events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceReport {
    pub work_hours: f64,
    pub meetings_count: usize,
    pub focus_time_hours: f64,
    pub overtime_hours: f64,
    pub avg_sleep_hours: f64,
    /// 0-100, higher is better.
    pub score: u32,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Thresholds the analysis scores against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancePreferences {
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub target_sleep_hours: f64,
}

impl Default for BalancePreferences {
    fn default() -> Self {
        Self { work_start_hour: 9, work_end_hour: 18, target_sleep_hours: 7.0 }
    }
}
