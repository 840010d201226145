//! # Slated Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The scheduling decision engine (intent classification, slot search,
//!   availability checking, event mutation, orchestration)
//! - Port/adapter interfaces (traits) for credentials, the calendar provider,
//!   and the event extractor
//!
//! ## Architecture Principles
//! - Only depends on `slated-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod balance;
pub mod commands;
pub mod intent;
pub mod orchestrator;
pub mod ports;
pub mod scheduling;
pub mod sessions;
pub mod time;

// Re-export specific items to avoid ambiguity
pub use commands::{CommandOutcome, CommandService};
pub use intent::{Intent, IntentClassifier};
pub use orchestrator::{BotOutcome, Orchestrator};
pub use ports::{CalendarPort, CredentialStore, EventBody, EventExtractor, ExtractionContext};
pub use scheduling::availability::{Availability, AvailabilityChecker};
pub use scheduling::mutator::{EventMutator, UpdateFields};
pub use scheduling::slot_finder::{SlotDecision, SlotFinder};
pub use sessions::EditSessions;
