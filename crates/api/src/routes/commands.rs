//! Slash-command handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use slated_domain::BalancePreferences;
use tracing::error;

use super::{apology, local_now, verified_json};
use crate::context::AppContext;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

impl CommandRequest {
    fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or("unknown")
    }
}

/// POST /command/today
pub async fn today(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: CommandRequest = match verified_json(&ctx, &headers, &body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match ctx.commands.today(request.user_id(), local_now()).await {
        Ok(outcome) => Json(json!({"text": outcome.message()})).into_response(),
        Err(err) => {
            error!(user_id = request.user_id(), error = %err, "today command failed");
            apology().into_response()
        }
    }
}

/// POST /command/week
pub async fn week(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: CommandRequest = match verified_json(&ctx, &headers, &body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match ctx.commands.week(request.user_id(), local_now()).await {
        Ok(outcome) => Json(json!({"text": outcome.message()})).into_response(),
        Err(err) => {
            error!(user_id = request.user_id(), error = %err, "week command failed");
            apology().into_response()
        }
    }
}

/// POST /command/delete
pub async fn delete(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: CommandRequest = match verified_json(&ctx, &headers, &body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let args = request.arguments.clone().unwrap_or_default();
    match ctx.commands.delete(request.user_id(), &args, local_now()).await {
        Ok(outcome) => Json(json!({"text": outcome.message()})).into_response(),
        Err(err) => {
            error!(user_id = request.user_id(), error = %err, "delete command failed");
            apology().into_response()
        }
    }
}

/// POST /command/balance
pub async fn balance(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: CommandRequest = match verified_json(&ctx, &headers, &body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let prefs = BalancePreferences::default();
    match ctx.commands.balance(request.user_id(), local_now(), &prefs).await {
        Ok(outcome) => Json(json!({"text": outcome.message()})).into_response(),
        Err(err) => {
            error!(user_id = request.user_id(), error = %err, "balance command failed");
            apology().into_response()
        }
    }
}
