//! Mock port implementations for testing
//!
//! In-memory mocks for the credential, calendar, and extractor ports,
//! enabling deterministic orchestrator tests without network or database
//! dependencies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use slated_core::ports::{
    CalendarPort, CredentialStore, EventBody, EventExtractor, ExtractionContext,
};
use slated_domain::{
    BusyInterval, CalendarEvent, EventDraft, MutationReceipt, OAuthTokens, Result, SlatedError,
    UserCredential,
};

/// In-memory mock for `CredentialStore`. Counts reads so tests can assert the
/// orchestrator never touched credentials on an early rejection.
#[derive(Default)]
pub struct MockCredentialStore {
    credentials: Mutex<Vec<UserCredential>>,
    pub get_calls: AtomicUsize,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user_id: &str) -> Self {
        self.credentials.lock().unwrap().push(UserCredential {
            user_id: user_id.to_string(),
            access_token: "token".into(),
            refresh_token: "refresh".into(),
            expiry_ms: i64::MAX,
        });
        self
    }

    pub fn gets(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserCredential>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn save(&self, user_id: &str, tokens: OAuthTokens) -> Result<()> {
        let mut creds = self.credentials.lock().unwrap();
        creds.retain(|c| c.user_id != user_id);
        creds.push(UserCredential {
            user_id: user_id.to_string(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token.unwrap_or_default(),
            expiry_ms: tokens.expiry_ms.unwrap_or(0),
        });
        Ok(())
    }

    async fn update_access_token(
        &self,
        user_id: &str,
        access_token: &str,
        expiry_ms: i64,
    ) -> Result<()> {
        let mut creds = self.credentials.lock().unwrap();
        let cred = creds
            .iter_mut()
            .find(|c| c.user_id == user_id)
            .ok_or_else(|| SlatedError::NotConnected(user_id.to_string()))?;
        cred.access_token = access_token.to_string();
        cred.expiry_ms = expiry_ms;
        Ok(())
    }
}

/// In-memory mock for `CalendarPort`. Seeded with busy intervals and events;
/// records every call and can be told to fail specific operations.
#[derive(Default)]
pub struct MockCalendarPort {
    busy: Mutex<Vec<BusyInterval>>,
    events: Mutex<Vec<CalendarEvent>>,
    pub fail_query: Mutex<Option<String>>,
    pub fail_mutation: Mutex<Option<String>>,
    pub inserted: Mutex<Vec<EventBody>>,
    pub updated: Mutex<Vec<(String, EventBody)>>,
    pub deleted: Mutex<Vec<String>>,
    pub query_calls: AtomicUsize,
}

impl MockCalendarPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_busy(self, intervals: Vec<BusyInterval>) -> Self {
        *self.busy.lock().unwrap() = intervals;
        self
    }

    pub fn with_events(self, events: Vec<CalendarEvent>) -> Self {
        *self.events.lock().unwrap() = events;
        self
    }

    pub fn failing_queries(self, reason: &str) -> Self {
        *self.fail_query.lock().unwrap() = Some(reason.to_string());
        self
    }

    pub fn failing_mutations(self, reason: &str) -> Self {
        *self.fail_mutation.lock().unwrap() = Some(reason.to_string());
        self
    }
}

#[async_trait]
impl CalendarPort for MockCalendarPort {
    async fn query_busy(
        &self,
        _credential: &UserCredential,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<BusyInterval>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.fail_query.lock().unwrap().clone() {
            return Err(SlatedError::Network(reason));
        }
        Ok(self
            .busy
            .lock()
            .unwrap()
            .iter()
            .filter(|interval| interval.overlaps(window_start, window_end))
            .cloned()
            .collect())
    }

    async fn list_events(
        &self,
        _credential: &UserCredential,
        window_start: DateTime<FixedOffset>,
        window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<CalendarEvent>> {
        if let Some(reason) = self.fail_query.lock().unwrap().clone() {
            return Err(SlatedError::Network(reason));
        }
        let mut events: Vec<CalendarEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.start < window_end && e.end > window_start)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start);
        Ok(events)
    }

    async fn insert_event(
        &self,
        _credential: &UserCredential,
        body: &EventBody,
    ) -> Result<MutationReceipt> {
        if let Some(reason) = self.fail_mutation.lock().unwrap().clone() {
            return Err(SlatedError::Mutation(reason));
        }
        self.inserted.lock().unwrap().push(body.clone());
        Ok(MutationReceipt {
            event_id: "ev-created".into(),
            html_link: Some("https://calendar.example/ev-created".into()),
        })
    }

    async fn update_event(
        &self,
        _credential: &UserCredential,
        event_id: &str,
        body: &EventBody,
    ) -> Result<MutationReceipt> {
        if let Some(reason) = self.fail_mutation.lock().unwrap().clone() {
            return Err(SlatedError::Mutation(reason));
        }
        self.updated.lock().unwrap().push((event_id.to_string(), body.clone()));
        Ok(MutationReceipt { event_id: event_id.to_string(), html_link: None })
    }

    async fn delete_event(&self, _credential: &UserCredential, event_id: &str) -> Result<()> {
        if let Some(reason) = self.fail_mutation.lock().unwrap().clone() {
            return Err(SlatedError::Mutation(reason));
        }
        self.deleted.lock().unwrap().push(event_id.to_string());
        Ok(())
    }
}

/// Canned-response mock for `EventExtractor`.
pub struct MockExtractor {
    result: Mutex<Option<std::result::Result<EventDraft, String>>>,
    pub calls: AtomicUsize,
}

impl MockExtractor {
    pub fn returning(draft: EventDraft) -> Self {
        Self { result: Mutex::new(Some(Ok(draft))), calls: AtomicUsize::new(0) }
    }

    pub fn failing(reason: &str) -> Self {
        Self { result: Mutex::new(Some(Err(reason.to_string()))), calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl EventExtractor for MockExtractor {
    async fn extract(&self, _text: &str, _ctx: &ExtractionContext) -> Result<EventDraft> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.result.lock().unwrap().clone() {
            Some(Ok(draft)) => Ok(draft),
            Some(Err(reason)) => Err(SlatedError::Extraction(reason)),
            None => Err(SlatedError::Extraction("no canned response".into())),
        }
    }
}
