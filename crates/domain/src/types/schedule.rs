//! Wall-clock scheduling primitives: minute-precision times of day and the
//! daily work window slot search operates within.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::UTC_OFFSET_SECS;
use crate::errors::SlatedError;

/// A wall-clock time of day with minute precision, rendered as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime {
    pub hour: u32,
    pub minute: u32,
}

impl WallTime {
    /// Construct a wall time, rejecting out-of-range components.
    pub fn new(hour: u32, minute: u32) -> Result<Self, SlatedError> {
        if hour > 23 || minute > 59 {
            return Err(SlatedError::InvalidInput(format!(
                "wall time out of range: {hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_from_midnight(self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// Inverse of [`minutes_from_midnight`]; values past 23:59 are rejected.
    ///
    /// [`minutes_from_midnight`]: WallTime::minutes_from_midnight
    pub fn from_minutes(minutes: u32) -> Result<Self, SlatedError> {
        Self::new(minutes / 60, minutes % 60)
    }

    /// Combine with a calendar date into an instant at the fixed offset.
    pub fn on(self, date: NaiveDate) -> DateTime<FixedOffset> {
        let offset = fixed_offset();
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0)
            .unwrap_or(NaiveTime::MIN);
        let naive = date.and_time(time);
        // A fixed offset maps every local time uniquely.
        offset
            .from_local_datetime(&naive)
            .single()
            .unwrap_or_else(|| offset.from_utc_datetime(&naive))
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for WallTime {
    type Err = SlatedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| SlatedError::InvalidInput(format!("invalid wall time: {s:?}")))?;
        let hour = h
            .parse::<u32>()
            .map_err(|_| SlatedError::InvalidInput(format!("invalid wall time: {s:?}")))?;
        let minute = m
            .parse::<u32>()
            .map_err(|_| SlatedError::InvalidInput(format!("invalid wall time: {s:?}")))?;
        Self::new(hour, minute)
    }
}

impl Serialize for WallTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WallTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e: SlatedError| D::Error::custom(e.to_string()))
    }
}

/// The daily range automatic slot search operates within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkWindow {
    pub start: WallTime,
    pub end: WallTime,
}

impl WorkWindow {
    pub fn new(start: WallTime, end: WallTime) -> Result<Self, SlatedError> {
        if start >= end {
            return Err(SlatedError::InvalidInput(format!(
                "work window start {start} is not before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a `"HH:MM-HH:MM"` configuration string.
    pub fn parse(s: &str) -> Result<Self, SlatedError> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| SlatedError::InvalidInput(format!("invalid work window: {s:?}")))?;
        Self::new(start.parse()?, end.parse()?)
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes_from_midnight() - self.start.minutes_from_midnight()
    }
}

impl Default for WorkWindow {
    fn default() -> Self {
        // Constants are compile-time valid; parse cannot fail here.
        Self {
            start: WallTime { hour: 9, minute: 0 },
            end: WallTime { hour: 18, minute: 0 },
        }
    }
}

impl fmt::Display for WorkWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The fixed offset all calendar timestamps are expressed in.
pub fn fixed_offset() -> FixedOffset {
    // UTC_OFFSET_SECS is a compile-time constant well inside chrono's range.
    FixedOffset::east_opt(UTC_OFFSET_SECS).expect("valid fixed offset")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_wall_time() {
        let t: WallTime = "09:30".parse().unwrap();
        assert_eq!(t, WallTime { hour: 9, minute: 30 });
        assert_eq!(t.to_string(), "09:30");
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert!("24:00".parse::<WallTime>().is_err());
        assert!("12:60".parse::<WallTime>().is_err());
        assert!("noon".parse::<WallTime>().is_err());
    }

    #[test]
    fn parses_work_window() {
        let w = WorkWindow::parse("09:00-18:00").unwrap();
        assert_eq!(w.duration_minutes(), 540);
        assert!(WorkWindow::parse("18:00-09:00").is_err());
    }

    #[test]
    fn wall_time_serde_round_trip() {
        let t: WallTime = "14:05".parse().unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"14:05\"");
        let back: WallTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
