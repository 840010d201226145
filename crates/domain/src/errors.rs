//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Slated
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SlatedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Calendar not connected for user {0}")]
    NotConnected(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Availability query error: {0}")]
    AvailabilityQuery(String),

    #[error("Mutation error: {0}")]
    Mutation(String),

    #[error("Edit session expired for user {0}")]
    SessionExpired(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Slated operations
pub type Result<T> = std::result::Result<T, SlatedError>;
