//! Route table and shared request plumbing.

mod bot;
mod calendar;
mod commands;
mod oauth;

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::warn;

use crate::context::AppContext;
use crate::signature;

/// Build the full application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/connect-calendar", get(oauth::connect_calendar))
        .route("/oauth/callback", get(oauth::callback))
        .route("/bot", post(bot::handle))
        .route("/command/today", post(commands::today))
        .route("/command/week", post(commands::week))
        .route("/command/delete", post(commands::delete))
        .route("/command/balance", post(commands::balance))
        .route("/calendar/update", post(calendar::update))
        .route("/calendar/delete", post(calendar::delete))
        .route("/widget/today", post(calendar::today_widget))
        .route("/widget/start-edit", post(calendar::start_edit))
        .with_state(ctx)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "running", "version": env!("CARGO_PKG_VERSION")}))
}

/// Current instant at the fixed calendar offset.
pub(crate) fn local_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&slated_domain::fixed_offset())
}

/// Verify the request signature and deserialize the body.
///
/// Unsigned or tampered requests get a 401; a body that fails to parse gets a
/// 400. Handlers only see verified payloads.
pub(crate) fn verified_json<T: DeserializeOwned>(
    ctx: &AppContext,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<T, Response> {
    let provided = headers
        .get(signature::SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if !signature::verify(&ctx.config.security.app_key, body, provided) {
        warn!("rejecting request with bad or missing signature");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized: invalid signature"})),
        )
            .into_response());
    }

    serde_json::from_slice(body).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("invalid request body: {e}")})),
        )
            .into_response()
    })
}

/// The generic apology for truly unexpected failures; detail goes to the log,
/// never to the chat.
pub(crate) fn apology() -> Json<serde_json::Value> {
    Json(json!({"text": "An error occurred. Please try again."}))
}
