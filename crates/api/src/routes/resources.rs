//! Resource status and refresh routes.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use lms_common::error::AppError;
use lms_common::types::Resource;
use lms_engine::{Dispatch, FetchOutcome, ResourceStatus};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/resources", get(list_resources))
        .route("/api/resources/{resource}", get(get_resource))
        .route("/api/resources/{resource}/refresh", post(refresh_resource))
        .route("/api/resources/{resource}/detail/open", post(open_detail))
        .route("/api/resources/{resource}/detail/close", post(close_detail))
        .route("/api/refresh", post(refresh_all))
}

#[derive(Debug, Serialize)]
struct ResourceDetail {
    #[serde(flatten)]
    status: ResourceStatus,
    data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct RefreshResult {
    /// `updated`, `failed`, or `in_flight` when an earlier fetch was reused.
    outcome: &'static str,
    error: Option<String>,
    status: ResourceStatus,
}

fn parse_resource(raw: &str) -> Result<Resource, AppError> {
    Ok(raw.parse::<Resource>()?)
}

/// GET /api/resources: Synchronization status of every resource.
async fn list_resources(State(state): State<AppState>) -> Json<Vec<ResourceStatus>> {
    Json(state.sync.status_all())
}

/// GET /api/resources/:resource: Status plus the cached payload.
async fn get_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<ResourceDetail>, AppError> {
    let resource = parse_resource(&resource)?;
    Ok(Json(ResourceDetail {
        status: state.sync.status(resource),
        data: state.sync.data(resource),
    }))
}

/// POST /api/resources/:resource/refresh: Manual refresh, bypassing TTL
/// and view context. Waits for the fetch to be applied.
async fn refresh_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<RefreshResult>, AppError> {
    let resource = parse_resource(&resource)?;

    let (outcome, error) = match state.sync.force_refresh(resource).wait().await {
        Some(FetchOutcome::Updated) => ("updated", None),
        Some(FetchOutcome::Failed(e)) => ("failed", Some(e.to_string())),
        None => ("in_flight", None),
    };

    Ok(Json(RefreshResult {
        outcome,
        error,
        status: state.sync.status(resource),
    }))
}

/// POST /api/refresh: Manual refresh of every resource. Does not wait.
async fn refresh_all(State(state): State<AppState>) -> Json<serde_json::Value> {
    let (started, in_flight): (Vec<_>, Vec<_>) = state
        .sync
        .force_refresh_all()
        .into_iter()
        .partition(|(_, dispatch)| matches!(dispatch, Dispatch::Started(_)));

    let names = |list: Vec<(Resource, Dispatch)>| list.into_iter().map(|(r, _)| r).collect::<Vec<_>>();
    Json(json!({
        "started": names(started),
        "in_flight": names(in_flight),
    }))
}

/// POST /api/resources/:resource/detail/open
async fn open_detail(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let resource = parse_resource(&resource)?;
    let cleared = state.sync.open_detail(resource);
    Ok(Json(json!({ "resource": resource, "pending_cleared": cleared })))
}

/// POST /api/resources/:resource/detail/close
async fn close_detail(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let resource = parse_resource(&resource)?;
    let cleared = state.sync.close_detail(resource);
    Ok(Json(json!({ "resource": resource, "pending_cleared": cleared })))
}
