//! View context routes.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use lms_common::error::AppError;
use lms_common::types::Resource;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/view", get(get_view).put(set_view))
}

#[derive(Debug, Deserialize)]
struct ViewRequest {
    /// `null` means no resource is in view.
    resource: Option<String>,
}

/// GET /api/view: The resource currently in view, if any.
async fn get_view(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "resource": state.sync.view_context() }))
}

/// PUT /api/view: Move the view context.
async fn set_view(
    State(state): State<AppState>,
    Json(body): Json<ViewRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let view = body
        .resource
        .as_deref()
        .map(str::parse::<Resource>)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let previous = state.sync.set_view_context(view);
    Ok(Json(json!({ "resource": view, "previous": previous })))
}
