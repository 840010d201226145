//! Port interfaces between the scheduling engine and infrastructure
//!
//! These traits define the boundaries between core business logic and
//! infrastructure implementations: credential persistence, the remote
//! calendar provider, and the natural-language event extractor.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use slated_domain::{
    BusyInterval, CalendarEvent, EventDraft, MutationReceipt, OAuthTokens, Result, UserCredential,
    WorkWindow,
};

/// Trait for encrypted per-user credential persistence.
///
/// Every access re-reads and decrypts the backing record; there is no
/// in-memory credential cache.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read and decrypt the credential for a user. `None` means not
    /// connected: no record, or a record with an empty access token.
    async fn get(&self, user_id: &str) -> Result<Option<UserCredential>>;

    /// Upsert a token set for a user, encrypting secrets independently.
    /// Merges into an existing record; a missing expiry defaults to
    /// now + 1 hour.
    async fn save(&self, user_id: &str, tokens: OAuthTokens) -> Result<()>;

    /// Replace the access token after a refresh cycle. Fails with a
    /// not-connected signal when the user has no record.
    async fn update_access_token(
        &self,
        user_id: &str,
        access_token: &str,
        expiry_ms: i64,
    ) -> Result<()>;
}

/// Event body handed to the calendar provider on insert/update. The provider
/// adapter translates this into its wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBody {
    pub summary: String,
    pub description: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Already filtered to plausible email addresses.
    pub attendees: Vec<String>,
    /// Minutes before start, popup reminders.
    pub reminder_minutes: Vec<u32>,
}

/// Trait for remote calendar operations.
#[async_trait]
pub trait CalendarPort: Send + Sync {
    /// Busy intervals within `[window_start, window_end)`, arbitrary order.
    async fn query_busy(
        &self,
        credential: &UserCredential,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<BusyInterval>>;

    /// Events within the window, ordered by start time.
    async fn list_events(
        &self,
        credential: &UserCredential,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>>;

    async fn insert_event(
        &self,
        credential: &UserCredential,
        body: &EventBody,
    ) -> Result<MutationReceipt>;

    async fn update_event(
        &self,
        credential: &UserCredential,
        event_id: &str,
        body: &EventBody,
    ) -> Result<MutationReceipt>;

    async fn delete_event(&self, credential: &UserCredential, event_id: &str) -> Result<()>;
}

/// Context handed to the extractor alongside the free text.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub timezone: String,
    pub work_hours: WorkWindow,
    pub today: NaiveDate,
}

/// Trait for the external natural-language event extractor.
///
/// The implementation must treat any provider output missing `title` or
/// `date` as an extraction failure regardless of the provider's own success
/// flag; a returned draft always carries both.
#[async_trait]
pub trait EventExtractor: Send + Sync {
    async fn extract(&self, text: &str, ctx: &ExtractionContext) -> Result<EventDraft>;
}
