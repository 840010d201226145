//! SQLite-backed credential store
//!
//! Persists one row per user with independently encrypted token columns.
//! Every read decrypts afresh; nothing is cached. Calls run on the blocking
//! pool since rusqlite is synchronous.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use slated_core::ports::CredentialStore;
use slated_domain::constants::DEFAULT_TOKEN_TTL_MS;
use slated_domain::{OAuthTokens, Result, SlatedError, UserCredential};
use tokio::task;
use tracing::debug;

use super::manager::DbManager;
use crate::crypto::TokenCipher;

/// SQLite implementation of `CredentialStore`.
pub struct SqliteCredentialStore {
    db: Arc<DbManager>,
    cipher: Arc<TokenCipher>,
}

impl SqliteCredentialStore {
    pub fn new(db: Arc<DbManager>, cipher: Arc<TokenCipher>) -> Self {
        Self { db, cipher }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserCredential>> {
        let db = Arc::clone(&self.db);
        let cipher = Arc::clone(&self.cipher);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> Result<Option<UserCredential>> {
            let conn = db.get_connection()?;

            let row: Option<(String, String, i64)> = conn
                .query_row(
                    "SELECT access_token, refresh_token, expiry_ms
                     FROM user_credentials WHERE user_id = ?1",
                    params![&user_id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()
                .map_err(|e| SlatedError::Database(format!("credential read failed: {e}")))?;

            let Some((access_enc, refresh_enc, expiry_ms)) = row else {
                debug!(%user_id, "no credential record");
                return Ok(None);
            };

            let access_token = cipher.decrypt(&access_enc);
            if access_token.is_empty() {
                // A record without a usable access token is not connected.
                return Ok(None);
            }

            Ok(Some(UserCredential {
                user_id,
                access_token,
                refresh_token: cipher.decrypt(&refresh_enc),
                expiry_ms,
            }))
        })
        .await
        .map_err(join_error)?
    }

    async fn save(&self, user_id: &str, tokens: OAuthTokens) -> Result<()> {
        let db = Arc::clone(&self.db);
        let cipher = Arc::clone(&self.cipher);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> Result<()> {
            let access_enc = cipher.encrypt(&tokens.access_token)?;
            let refresh_enc = cipher.encrypt(tokens.refresh_token.as_deref().unwrap_or(""))?;
            let now_ms = Utc::now().timestamp_millis();
            let expiry_ms = tokens.expiry_ms.unwrap_or(now_ms + DEFAULT_TOKEN_TTL_MS);

            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO user_credentials
                     (user_id, access_token, refresh_token, expiry_ms, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(user_id) DO UPDATE SET
                     access_token = excluded.access_token,
                     refresh_token = excluded.refresh_token,
                     expiry_ms = excluded.expiry_ms,
                     updated_at = excluded.updated_at",
                params![&user_id, &access_enc, &refresh_enc, expiry_ms, now_ms],
            )
            .map_err(|e| SlatedError::Database(format!("credential save failed: {e}")))?;

            debug!(%user_id, "tokens saved");
            Ok(())
        })
        .await
        .map_err(join_error)?
    }

    async fn update_access_token(
        &self,
        user_id: &str,
        access_token: &str,
        expiry_ms: i64,
    ) -> Result<()> {
        let db = Arc::clone(&self.db);
        let cipher = Arc::clone(&self.cipher);
        let user_id = user_id.to_string();
        let access_token = access_token.to_string();

        task::spawn_blocking(move || -> Result<()> {
            let access_enc = cipher.encrypt(&access_token)?;
            let now_ms = Utc::now().timestamp_millis();

            let conn = db.get_connection()?;
            let updated = conn
                .execute(
                    "UPDATE user_credentials
                     SET access_token = ?2, expiry_ms = ?3, updated_at = ?4
                     WHERE user_id = ?1",
                    params![&user_id, &access_enc, expiry_ms, now_ms],
                )
                .map_err(|e| {
                    SlatedError::Database(format!("access token update failed: {e}"))
                })?;

            if updated == 0 {
                return Err(SlatedError::NotConnected(user_id));
            }
            Ok(())
        })
        .await
        .map_err(join_error)?
    }
}

fn join_error(err: task::JoinError) -> SlatedError {
    SlatedError::Internal(format!("blocking task failed: {err}"))
}
