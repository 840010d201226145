//! OAuth connect flow: consent redirect and provider callback.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tracing::{error, info};

use crate::context::AppContext;

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

/// GET /connect-calendar - redirect the user to the provider consent page,
/// carrying their chat user id in the OAuth state.
pub async fn connect_calendar(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<ConnectQuery>,
) -> Response {
    let user_id = query.user_id.unwrap_or_else(|| "unknown".to_string());
    info!(%user_id, "calendar connection initiated");

    match ctx.oauth.authorization_url(&user_id) {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(err) => {
            error!(error = %err, "failed to build authorization url");
            Html("Failed to start calendar connection.".to_string()).into_response()
        }
    }
}

/// GET /oauth/callback - exchange the authorization code and persist the
/// encrypted tokens for the user named by the state parameter.
pub async fn callback(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<CallbackQuery>,
) -> Html<String> {
    let Some(code) = query.code else {
        return Html("Authorization failed. No code received.".to_string());
    };
    let user_id = query.state.unwrap_or_else(|| "unknown".to_string());

    let tokens = match ctx.oauth.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(err) => {
            error!(%user_id, error = %err, "oauth code exchange failed");
            return Html(format!("Failed to connect calendar: {err}"));
        }
    };

    if let Err(err) = ctx.credentials.save(&user_id, tokens).await {
        error!(%user_id, error = %err, "failed to persist tokens");
        return Html("Failed to save calendar connection. Please try again.".to_string());
    }

    info!(%user_id, "calendar connected");
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Calendar Connected</title></head>\n<body>\n\
         <h1>Calendar Connected!</h1>\n\
         <p>Your Google Calendar is now connected. User ID: {user_id}</p>\n\
         <p><strong>Go back to the chat and start scheduling!</strong></p>\n\
         <p>You can close this window now.</p>\n</body>\n</html>"
    ))
}
