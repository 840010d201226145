//! OAuth credential types
//!
//! Tokens are encrypted at rest; the plaintext forms below exist only in
//! memory while a request is being served.

use serde::{Deserialize, Serialize};

/// Token set returned by the provider's token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Expiry as epoch milliseconds. Defaults to now + 1 hour when the
    /// provider omits it.
    pub expiry_ms: Option<i64>,
}

/// Decrypted per-user credential as read from the store.
///
/// A record with an empty `access_token` is never returned; the store reports
/// it as not connected instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredential {
    pub user_id: String,
    pub access_token: String,
    /// Empty when the grant did not include a refresh token.
    pub refresh_token: String,
    pub expiry_ms: i64,
}

impl UserCredential {
    /// Whether the access token has passed its recorded expiry.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expiry_ms <= now_ms
    }
}
