//! Common data types used throughout the application

pub mod balance;
pub mod credential;
pub mod event;
pub mod schedule;

pub use balance::*;
pub use credential::*;
pub use event::*;
pub use schedule::*;
