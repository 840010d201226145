//! Orchestrator state-machine tests against in-memory mock ports.

mod support;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use slated_core::scheduling::mutator::UpdateFields;
use slated_core::{
    AvailabilityChecker, BotOutcome, EditSessions, EventMutator, Intent, Orchestrator, SlotFinder,
};
use slated_domain::{
    fixed_offset, BusyInterval, EventDraft, SlatedError, WallTime, WorkWindow,
};
use support::{MockCalendarPort, MockCredentialStore, MockExtractor};

const TZ: &str = "Asia/Kolkata";

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn now() -> DateTime<FixedOffset> {
    fixed_offset().with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
}

fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
    fixed_offset().with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
}

fn draft(time: Option<WallTime>) -> EventDraft {
    EventDraft {
        title: "Team sync".into(),
        date: date(),
        time,
        duration_hours: 1.0,
        event_type: Default::default(),
        priority: Default::default(),
        participants: vec![],
        description: String::new(),
        flexible: false,
    }
}

struct Harness {
    store: Arc<MockCredentialStore>,
    calendar: Arc<MockCalendarPort>,
    extractor: Arc<MockExtractor>,
    orchestrator: Orchestrator,
}

fn harness(
    store: MockCredentialStore,
    calendar: MockCalendarPort,
    extractor: MockExtractor,
) -> Harness {
    let store = Arc::new(store);
    let calendar = Arc::new(calendar);
    let extractor = Arc::new(extractor);
    let sessions = Arc::new(EditSessions::new());
    let orchestrator = Orchestrator::new(
        store.clone(),
        extractor.clone(),
        SlotFinder::new(calendar.clone()),
        AvailabilityChecker::new(calendar.clone()),
        EventMutator::new(calendar.clone(), sessions.clone()),
        sessions,
        WorkWindow::parse("09:00-18:00").unwrap(),
        TZ.into(),
    );
    Harness { store, calendar, extractor, orchestrator }
}

#[tokio::test]
async fn greetings_never_touch_credentials() {
    let h = harness(
        MockCredentialStore::new().with_user("u1"),
        MockCalendarPort::new(),
        MockExtractor::returning(draft(None)),
    );

    for text in ["hi", "hello there", "good morning"] {
        let outcome = h.orchestrator.handle_message("u1", text, now()).await.unwrap();
        assert!(matches!(outcome, BotOutcome::Rejected(Intent::Greeting)), "text: {text}");
    }
    assert_eq!(h.store.gets(), 0);
    assert_eq!(h.extractor.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unconnected_user_is_asked_to_connect() {
    let h = harness(
        MockCredentialStore::new(),
        MockCalendarPort::new(),
        MockExtractor::returning(draft(Some(WallTime { hour: 15, minute: 0 }))),
    );

    let outcome =
        h.orchestrator.handle_message("u1", "schedule a meeting tomorrow", now()).await.unwrap();
    assert!(matches!(outcome, BotOutcome::AwaitingConnection));
    assert!(outcome.message().contains("connect"));
    // No calendar call was ever made.
    assert_eq!(h.calendar.query_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn extraction_failure_is_reported_with_examples() {
    let h = harness(
        MockCredentialStore::new().with_user("u1"),
        MockCalendarPort::new(),
        MockExtractor::failing("missing required fields"),
    );

    let outcome =
        h.orchestrator.handle_message("u1", "schedule the thing", now()).await.unwrap();
    let BotOutcome::ExtractionFailed { reason } = outcome.clone() else {
        panic!("expected ExtractionFailed, got {outcome:?}");
    };
    assert_eq!(reason, "missing required fields");
    assert!(outcome.message().contains("Schedule meeting with team tomorrow at 3 PM"));
}

#[tokio::test]
async fn missing_time_resolves_to_earliest_free_slot() {
    // Scenario C: busy 09:00-10:00, 1h event -> slot search lands on 10:00.
    let busy = vec![BusyInterval { start: at(9, 0), end: at(10, 0) }];
    let h = harness(
        MockCredentialStore::new().with_user("u1"),
        MockCalendarPort::new().with_busy(busy),
        MockExtractor::returning(draft(None)),
    );

    let outcome =
        h.orchestrator.handle_message("u1", "schedule team sync today", now()).await.unwrap();
    let BotOutcome::Created { time, end, .. } = outcome else {
        panic!("expected Created, got {outcome:?}");
    };
    assert_eq!(time, WallTime { hour: 10, minute: 0 });
    assert_eq!(end, WallTime { hour: 11, minute: 0 });

    let inserted = h.calendar.inserted.lock().unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].reminder_minutes, vec![30, 10]);
}

#[tokio::test]
async fn oversized_duration_reports_no_free_slot() {
    // Scenario D: 10h does not fit into a 9h work window.
    let mut d = draft(None);
    d.duration_hours = 10.0;
    let h = harness(
        MockCredentialStore::new().with_user("u1"),
        MockCalendarPort::new(),
        MockExtractor::returning(d),
    );

    let outcome =
        h.orchestrator.handle_message("u1", "block ten hours today", now()).await.unwrap();
    assert!(matches!(outcome, BotOutcome::NoFreeSlot { .. }), "got {outcome:?}");
    assert!(h.calendar.inserted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fully_booked_window_reports_busy_slots() {
    // One interval covering the whole work window leaves no candidate free.
    let busy = vec![BusyInterval { start: at(9, 0), end: at(18, 0) }];
    let h = harness(
        MockCredentialStore::new().with_user("u1"),
        MockCalendarPort::new().with_busy(busy),
        MockExtractor::returning(draft(None)),
    );

    let outcome =
        h.orchestrator.handle_message("u1", "schedule team sync today", now()).await.unwrap();
    let BotOutcome::NoFreeSlot { busy, .. } = outcome else {
        panic!("expected NoFreeSlot, got {outcome:?}");
    };
    assert_eq!(busy.len(), 1);
}

#[tokio::test]
async fn explicit_time_conflict_lists_overlaps() {
    let busy = vec![BusyInterval { start: at(14, 30), end: at(15, 30) }];
    let h = harness(
        MockCredentialStore::new().with_user("u1"),
        MockCalendarPort::new().with_busy(busy),
        MockExtractor::returning(draft(Some(WallTime { hour: 15, minute: 0 }))),
    );

    let outcome =
        h.orchestrator.handle_message("u1", "meet dana at 3 pm today", now()).await.unwrap();
    let BotOutcome::Conflict { busy, .. } = outcome.clone() else {
        panic!("expected Conflict, got {outcome:?}");
    };
    assert_eq!(busy.len(), 1);
    assert!(outcome.message().contains("14:30"));
    assert!(h.calendar.inserted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn boundary_touching_event_is_not_a_conflict() {
    // Busy ends exactly when the request starts: half-open, no overlap.
    let busy = vec![BusyInterval { start: at(14, 0), end: at(15, 0) }];
    let h = harness(
        MockCredentialStore::new().with_user("u1"),
        MockCalendarPort::new().with_busy(busy),
        MockExtractor::returning(draft(Some(WallTime { hour: 15, minute: 0 }))),
    );

    let outcome =
        h.orchestrator.handle_message("u1", "meet dana at 3 pm today", now()).await.unwrap();
    assert!(matches!(outcome, BotOutcome::Created { .. }), "got {outcome:?}");
}

#[tokio::test]
async fn query_failure_never_reads_as_busy_and_blocks_mutation() {
    let h = harness(
        MockCredentialStore::new().with_user("u1"),
        MockCalendarPort::new().failing_queries("backend unavailable"),
        MockExtractor::returning(draft(Some(WallTime { hour: 15, minute: 0 }))),
    );

    let outcome =
        h.orchestrator.handle_message("u1", "meet dana at 3 pm today", now()).await.unwrap();
    assert!(matches!(outcome, BotOutcome::AvailabilityFailed { .. }), "got {outcome:?}");
    assert!(h.calendar.inserted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn provider_mutation_error_is_surfaced() {
    let h = harness(
        MockCredentialStore::new().with_user("u1"),
        MockCalendarPort::new().failing_mutations("quota exceeded"),
        MockExtractor::returning(draft(Some(WallTime { hour: 15, minute: 0 }))),
    );

    let outcome =
        h.orchestrator.handle_message("u1", "meet dana at 3 pm today", now()).await.unwrap();
    let BotOutcome::MutationFailed { reason } = outcome else {
        panic!("expected MutationFailed, got {outcome:?}");
    };
    assert!(reason.contains("quota exceeded"));
}

#[tokio::test]
async fn update_without_start_edit_is_session_expired() {
    // Scenario F.
    let h = harness(
        MockCredentialStore::new().with_user("u2"),
        MockCalendarPort::new(),
        MockExtractor::returning(draft(None)),
    );

    let fields = UpdateFields {
        title: "Moved sync".into(),
        date: date(),
        time: WallTime { hour: 11, minute: 0 },
        duration_hours: 1.0,
    };
    let err = h.orchestrator.submit_update("u2", &fields).await.unwrap_err();
    assert!(matches!(err, SlatedError::SessionExpired(_)), "got {err:?}");
}

#[tokio::test]
async fn update_resolves_latest_edit_session_and_clears_it() {
    let h = harness(
        MockCredentialStore::new().with_user("u1"),
        MockCalendarPort::new(),
        MockExtractor::returning(draft(None)),
    );

    h.orchestrator.start_edit("u1", "ev-old");
    h.orchestrator.start_edit("u1", "ev-new");

    let fields = UpdateFields {
        title: "Moved sync".into(),
        date: date(),
        time: WallTime { hour: 11, minute: 0 },
        duration_hours: 1.5,
    };
    let receipt = h.orchestrator.submit_update("u1", &fields).await.unwrap();
    assert_eq!(receipt.event_id, "ev-new");

    let updated = h.calendar.updated.lock().unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, "ev-new");
    // End derived from start + duration.
    assert_eq!(updated[0].1.end.format("%H:%M").to_string(), "12:30");
    drop(updated);

    // Session consumed: a second submit is expired.
    let err = h.orchestrator.submit_update("u1", &fields).await.unwrap_err();
    assert!(matches!(err, SlatedError::SessionExpired(_)));
}

#[tokio::test]
async fn slot_search_is_idempotent_for_identical_busy_data() {
    let busy = vec![
        BusyInterval { start: at(9, 0), end: at(11, 0) },
        BusyInterval { start: at(12, 0), end: at(13, 0) },
    ];
    let calendar = Arc::new(MockCalendarPort::new().with_busy(busy));
    let finder = SlotFinder::new(calendar.clone());
    let credential = slated_domain::UserCredential {
        user_id: "u1".into(),
        access_token: "t".into(),
        refresh_token: String::new(),
        expiry_ms: i64::MAX,
    };
    let window = WorkWindow::parse("09:00-18:00").unwrap();

    let first = finder.find_free_slot(&credential, date(), 1.0, window).await.unwrap();
    let second = finder.find_free_slot(&credential, date(), 1.0, window).await.unwrap();
    match (first, second) {
        (
            slated_core::SlotDecision::Free(a),
            slated_core::SlotDecision::Free(b),
        ) => {
            assert_eq!(a, b);
            assert_eq!(a, WallTime { hour: 11, minute: 0 });
        }
        other => panic!("expected identical free slots, got {other:?}"),
    }
}
