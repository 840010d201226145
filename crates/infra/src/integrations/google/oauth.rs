//! Google OAuth flow: consent URL, code exchange, and token refresh.
//!
//! The user id rides in the OAuth `state` parameter so the callback can
//! associate the issued tokens with the requesting chat user.

use chrono::Utc;
use reqwest::Method;
use slated_domain::constants::DEFAULT_TOKEN_TTL_MS;
use slated_domain::{GoogleConfig, OAuthTokens, Result, SlatedError};
use tracing::info;
use url::Url;

use super::types::TokenResponse;
use crate::http::HttpClient;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
];

/// OAuth client for the Google Calendar grant.
pub struct GoogleOAuth {
    http: HttpClient,
    config: GoogleConfig,
    token_endpoint: String,
}

impl GoogleOAuth {
    pub fn new(http: HttpClient, config: GoogleConfig) -> Self {
        Self { http, config, token_endpoint: TOKEN_ENDPOINT.to_string() }
    }

    /// Point the token endpoint at a mock server.
    #[cfg(test)]
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    /// Build the consent URL the user is redirected to.
    pub fn authorization_url(&self, user_id: &str) -> Result<String> {
        let mut url = Url::parse(AUTH_ENDPOINT)
            .map_err(|e| SlatedError::Internal(format!("invalid auth endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", user_id);
        Ok(url.into())
    }

    /// Exchange an authorization code for tokens. A response without an
    /// access token is an error; a missing expiry defaults to one hour out.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthTokens> {
        let response = self
            .http
            .send(self.http.request(Method::POST, &self.token_endpoint).form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ]))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text =
                response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(SlatedError::Network(format!(
                "token exchange failed ({status}): {error_text}"
            )));
        }

        let parsed: TokenResponse = response.json().await.map_err(|e| {
            SlatedError::Network(format!("failed to parse token response: {e}"))
        })?;

        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SlatedError::Network("no access token in token response".into()))?;

        info!(has_refresh = parsed.refresh_token.is_some(), "authorization code exchanged");

        Ok(OAuthTokens {
            access_token,
            refresh_token: parsed.refresh_token,
            expiry_ms: Some(expiry_from(parsed.expires_in)),
        })
    }

    /// Refresh an access token. Returns the new token and its expiry.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<(String, i64)> {
        let response = self
            .http
            .send(self.http.request(Method::POST, &self.token_endpoint).form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ]))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text =
                response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(SlatedError::Network(format!(
                "token refresh failed ({status}): {error_text}"
            )));
        }

        let parsed: TokenResponse = response.json().await.map_err(|e| {
            SlatedError::Network(format!("failed to parse refresh response: {e}"))
        })?;

        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SlatedError::Network("no access token in refresh response".into()))?;

        Ok((access_token, expiry_from(parsed.expires_in)))
    }
}

fn expiry_from(expires_in: Option<i64>) -> i64 {
    let now_ms = Utc::now().timestamp_millis();
    match expires_in {
        Some(secs) => now_ms + secs * 1000,
        None => now_ms + DEFAULT_TOKEN_TTL_MS,
    }
}
