//! Synthetic event and notification history.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use lms_common::types::{Notification, SyntheticEvent};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/notifications", get(list_notifications))
}

/// GET /api/events: Recent synthetic events, newest first.
async fn list_events(State(state): State<AppState>) -> Json<Vec<SyntheticEvent>> {
    Json(state.events.recent())
}

/// GET /api/notifications: Recent synchronizer notifications, newest first.
async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifications.recent())
}
