//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Calendar provider configuration
pub const PRIMARY_CALENDAR_ID: &str = "primary";
pub const CALENDAR_TIMEZONE: &str = "Asia/Kolkata";

/// Fixed UTC offset for all calendar timestamps. The assistant operates in a
/// single timezone; arbitrary-timezone users are out of scope.
pub const UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

// Work window defaults (wall-clock, HH:MM)
pub const DEFAULT_WORK_START: &str = "09:00";
pub const DEFAULT_WORK_END: &str = "18:00";

// Event reminders, minutes before start. Not configurable.
pub const REMINDER_MINUTES: [u32; 2] = [30, 10];

// Slot search grid spacing
pub const SLOT_GRID_MINUTES: u32 = 30;

// Inbound message limits
pub const MIN_MESSAGE_LEN: usize = 3;
pub const MAX_MESSAGE_LEN: usize = 1000;

// Token lifetime fallback when the provider omits an expiry
pub const DEFAULT_TOKEN_TTL_MS: i64 = 3_600_000;
