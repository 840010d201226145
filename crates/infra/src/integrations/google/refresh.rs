//! Expiry-aware credential resolution
//!
//! Decorates a `CredentialStore` so that reads transparently refresh an
//! expired access token through the OAuth client and persist the result via
//! `update_access_token`. Concurrent refreshes for the same user are
//! last-write-wins; a failed refresh keeps the stale token and lets the
//! provider reject it at call time.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use slated_core::ports::CredentialStore;
use slated_domain::{OAuthTokens, Result, UserCredential};
use tracing::{info, warn};

use super::oauth::GoogleOAuth;

/// `CredentialStore` decorator that refreshes expired access tokens on read.
pub struct RefreshingCredentialStore {
    inner: Arc<dyn CredentialStore>,
    oauth: Arc<GoogleOAuth>,
}

impl RefreshingCredentialStore {
    pub fn new(inner: Arc<dyn CredentialStore>, oauth: Arc<GoogleOAuth>) -> Self {
        Self { inner, oauth }
    }
}

#[async_trait]
impl CredentialStore for RefreshingCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserCredential>> {
        let Some(mut credential) = self.inner.get(user_id).await? else {
            return Ok(None);
        };

        let now_ms = Utc::now().timestamp_millis();
        if credential.is_expired(now_ms) && !credential.refresh_token.is_empty() {
            match self.oauth.refresh_access_token(&credential.refresh_token).await {
                Ok((access_token, expiry_ms)) => {
                    self.inner.update_access_token(user_id, &access_token, expiry_ms).await?;
                    info!(user_id, "access token refreshed");
                    credential.access_token = access_token;
                    credential.expiry_ms = expiry_ms;
                }
                Err(err) => {
                    // Keep the stale token; the provider will reject it and
                    // the failure surfaces on the actual calendar call.
                    warn!(user_id, error = %err, "token refresh failed");
                }
            }
        }

        Ok(Some(credential))
    }

    async fn save(&self, user_id: &str, tokens: OAuthTokens) -> Result<()> {
        self.inner.save(user_id, tokens).await
    }

    async fn update_access_token(
        &self,
        user_id: &str,
        access_token: &str,
        expiry_ms: i64,
    ) -> Result<()> {
        self.inner.update_access_token(user_id, access_token, expiry_ms).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use slated_domain::{GoogleConfig, SlatedError};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::HttpClient;

    /// Single-user in-memory store for decorator tests.
    #[derive(Default)]
    struct StubStore {
        credential: Mutex<Option<UserCredential>>,
    }

    #[async_trait]
    impl CredentialStore for StubStore {
        async fn get(&self, _user_id: &str) -> Result<Option<UserCredential>> {
            Ok(self.credential.lock().unwrap().clone())
        }

        async fn save(&self, user_id: &str, tokens: OAuthTokens) -> Result<()> {
            *self.credential.lock().unwrap() = Some(UserCredential {
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
            let mut guard = self.credential.lock().unwrap();
            let credential = guard
                .as_mut()
                .ok_or_else(|| SlatedError::NotConnected(user_id.to_string()))?;
            credential.access_token = access_token.to_string();
            credential.expiry_ms = expiry_ms;
            Ok(())
        }
    }

    fn oauth(server: &MockServer) -> Arc<GoogleOAuth> {
        Arc::new(
            GoogleOAuth::new(
                HttpClient::new().unwrap(),
                GoogleConfig {
                    client_id: "id".into(),
                    client_secret: "secret".into(),
                    redirect_uri: "http://localhost/oauth/callback".into(),
                },
            )
            .with_token_endpoint(format!("{}/token", server.uri())),
        )
    }

    fn stub_with(expiry_ms: i64, refresh_token: &str) -> Arc<StubStore> {
        let stub = Arc::new(StubStore::default());
        *stub.credential.lock().unwrap() = Some(UserCredential {
            user_id: "u1".into(),
            access_token: "stale".into(),
            refresh_token: refresh_token.to_string(),
            expiry_ms,
        });
        stub
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stub = stub_with(0, "refresh-1");
        let store = RefreshingCredentialStore::new(stub.clone(), oauth(&server));

        let credential = store.get("u1").await.unwrap().unwrap();
        assert_eq!(credential.access_token, "fresh");
        // Persisted through update_access_token, not just returned.
        let persisted = stub.credential.lock().unwrap().clone().unwrap();
        assert_eq!(persisted.access_token, "fresh");
        assert!(persisted.expiry_ms > Utc::now().timestamp_millis());
    }

    #[tokio::test]
    async fn valid_token_skips_the_refresh_call() {
        let server = MockServer::start().await;
        // No mock mounted: any request to the token endpoint would 404 and
        // the expect(0) below would catch it.
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let stub = stub_with(Utc::now().timestamp_millis() + 600_000, "refresh-1");
        let store = RefreshingCredentialStore::new(stub, oauth(&server));

        let credential = store.get("u1").await.unwrap().unwrap();
        assert_eq!(credential.access_token, "stale");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_stale_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let stub = stub_with(0, "stale-refresh");
        let store = RefreshingCredentialStore::new(stub, oauth(&server));

        let credential = store.get("u1").await.unwrap().unwrap();
        assert_eq!(credential.access_token, "stale");
    }

    #[tokio::test]
    async fn missing_refresh_token_is_left_alone() {
        let server = MockServer::start().await;
        let stub = stub_with(0, "");
        let store = RefreshingCredentialStore::new(stub, oauth(&server));

        let credential = store.get("u1").await.unwrap().unwrap();
        assert_eq!(credential.access_token, "stale");
    }
}
