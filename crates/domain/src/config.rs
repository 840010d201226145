//! Application configuration structures
//!
//! Loaded by `slated-infra::config` from environment variables or a
//! JSON/TOML file; validated at startup.

use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub google: GoogleConfig,
    pub extractor: ExtractorConfig,
    pub server: ServerConfig,
}

/// SQLite database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Secrets used to protect credentials at rest and verify inbound requests.
///
/// `encryption_key` must be exactly 32 bytes; startup fails otherwise. There
/// is deliberately no default key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub encryption_key: String,
    pub app_key: String,
}

/// Google Calendar OAuth client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Event extractor (LLM) API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub api_key: String,
    #[serde(default = "default_extractor_url")]
    pub api_url: String,
    #[serde(default = "default_extractor_model")]
    pub model: String,
}

/// HTTP surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Daily work window as "HH:MM-HH:MM"
    #[serde(default = "default_work_hours")]
    pub work_hours: String,
}

fn default_extractor_url() -> String {
    "https://api.perplexity.ai/chat/completions".to_string()
}

fn default_extractor_model() -> String {
    "sonar".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_work_hours() -> String {
    format!("{}-{}", crate::constants::DEFAULT_WORK_START, crate::constants::DEFAULT_WORK_END)
}
