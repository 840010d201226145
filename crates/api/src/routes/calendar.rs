//! Widget-driven calendar operations: start-edit, submit update, delete, and
//! the today widget itself.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use slated_core::UpdateFields;
use slated_domain::{SlatedError, WallTime};
use tracing::{error, info};

use super::{local_now, verified_json};
use crate::cards;
use crate::context::AppContext;

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(rename = "userId")]
    user_id: String,
    summary: String,
    date: NaiveDate,
    #[serde(rename = "startTime")]
    start_time: WallTime,
    #[serde(rename = "endTime")]
    end_time: WallTime,
}

#[derive(Debug, Deserialize)]
pub struct EventRequest {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "eventId")]
    event_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WidgetRequest {
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
}

/// POST /calendar/update - submit the edit the user started from the widget.
///
/// The wire carries start and end wall times; duration is recovered from the
/// pair and the end time re-derived in the core so the clamping policy holds.
pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: UpdateRequest = match verified_json(&ctx, &headers, &body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start = request.start_time.minutes_from_midnight();
    let end = request.end_time.minutes_from_midnight();
    if end <= start {
        return Json(json!({"success": false, "error": "end time must be after start time"}))
            .into_response();
    }

    let fields = UpdateFields {
        title: request.summary,
        date: request.date,
        time: request.start_time,
        duration_hours: f64::from(end - start) / 60.0,
    };

    match ctx.orchestrator.submit_update(&request.user_id, &fields).await {
        Ok(receipt) => {
            info!(user_id = %request.user_id, event_id = %receipt.event_id, "event updated");
            Json(json!({
                "success": true,
                "message": "Task updated successfully",
                "eventId": receipt.event_id
            }))
            .into_response()
        }
        Err(SlatedError::SessionExpired(_)) => Json(json!({
            "success": false,
            "error": "No edit session found. Please try again."
        }))
        .into_response(),
        Err(SlatedError::NotConnected(_)) => {
            Json(json!({"success": false, "error": "Not authenticated"})).into_response()
        }
        Err(err) => {
            error!(user_id = %request.user_id, error = %err, "event update failed");
            Json(json!({"success": false, "error": err.to_string()})).into_response()
        }
    }
}

/// POST /calendar/delete - delete an event chosen in the widget.
pub async fn delete(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: EventRequest = match verified_json(&ctx, &headers, &body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match ctx.orchestrator.delete_event(&request.user_id, &request.event_id).await {
        Ok(()) => {
            info!(user_id = %request.user_id, event_id = %request.event_id, "event deleted");
            Json(json!({"success": true, "message": "Task deleted successfully"})).into_response()
        }
        Err(SlatedError::NotConnected(_)) => {
            Json(json!({"success": false, "error": "Not authenticated"})).into_response()
        }
        Err(err) => {
            error!(user_id = %request.user_id, error = %err, "event delete failed");
            Json(json!({"success": false, "error": err.to_string()})).into_response()
        }
    }
}

/// POST /widget/start-edit - remember which event the user is editing.
pub async fn start_edit(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: EventRequest = match verified_json(&ctx, &headers, &body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(user_id = %request.user_id, event_id = %request.event_id, "edit session started");
    ctx.orchestrator.start_edit(&request.user_id, &request.event_id);
    Json(json!({"success": true})).into_response()
}

/// POST /widget/today - render the day's schedule widget.
pub async fn today_widget(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: WidgetRequest = match verified_json(&ctx, &headers, &body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let Some(user_id) = request.user_id else {
        return Json(cards::error_widget("Could not identify user")).into_response();
    };

    let now = local_now();
    let credential = match ctx.credentials.get(&user_id).await {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            return Json(cards::error_widget(
                "Please connect your Google Calendar first using /connect",
            ))
            .into_response();
        }
        Err(err) => {
            error!(%user_id, error = %err, "credential read failed for widget");
            return Json(cards::error_widget("Error loading calendar data")).into_response();
        }
    };

    let date = now.date_naive();
    let window_start = WallTime { hour: 0, minute: 0 }.on(date);
    let window_end = WallTime { hour: 23, minute: 59 }.on(date);

    match ctx.calendar.list_events(&credential, window_start, window_end).await {
        Ok(events) => Json(cards::today_widget(&events, now)).into_response(),
        Err(err) => {
            error!(%user_id, error = %err, "widget event listing failed");
            Json(cards::error_widget(&format!("Error loading calendar data: {err}")))
                .into_response()
        }
    }
}
