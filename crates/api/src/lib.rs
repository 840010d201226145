//! # Slated API
//!
//! HTTP surface - thin transport glue around the scheduling core.
//!
//! This crate contains:
//! - Route handlers (bot messages, slash commands, OAuth callback, widget)
//! - Request signature verification
//! - Card/widget JSON rendering
//! - Application context (dependency injection) and the main entry point

pub mod cards;
pub mod context;
pub mod routes;
pub mod signature;

pub use context::AppContext;
