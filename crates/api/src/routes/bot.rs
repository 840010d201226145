//! Inbound chat message handler.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};

use super::{apology, local_now, verified_json};
use crate::cards;
use crate::context::AppContext;
use crate::signature::sanitize_text;

#[derive(Debug, Deserialize)]
pub struct BotRequest {
    #[serde(default)]
    text: String,
    user: Option<UserRef>,
}

#[derive(Debug, Deserialize)]
pub struct UserRef {
    id: Option<String>,
    #[allow(dead_code)]
    name: Option<String>,
}

/// POST /bot - the free-text scheduling entry point.
pub async fn handle(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: BotRequest = match verified_json(&ctx, &headers, &body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let user_id = request
        .user
        .and_then(|u| u.id)
        .unwrap_or_else(|| "unknown".to_string());
    let text = sanitize_text(&request.text);

    info!(%user_id, text_len = text.len(), "bot message received");

    match ctx.orchestrator.handle_message(&user_id, &text, local_now()).await {
        Ok(outcome) => Json(cards::render_bot_outcome(&outcome)).into_response(),
        Err(err) => {
            error!(%user_id, error = %err, "unexpected failure handling bot message");
            apology().into_response()
        }
    }
}
