//! Shared HTTP client
//!
//! Thin wrapper over reqwest that applies the configured timeout and maps
//! transport failures onto the domain error type. Exactly one attempt per
//! call: every failure is reported once, nothing is retried.

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use slated_domain::{Result, SlatedError};
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest client with uniform timeout and error mapping.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Build a client with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SlatedError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request, mapping transport failures to `Network`.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            SlatedError::Network(format!("http request failed: {e}"))
        })?;
        debug!(status = response.status().as_u16(), url = %response.url(), "http response");
        Ok(response)
    }
}
