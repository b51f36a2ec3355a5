//! Officer action routes: apply a backend mutation, then refresh what it touched.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use lms_common::error::AppError;
use lms_common::models::NewLimitTemplate;
use lms_common::types::Resource;
use lms_engine::{Action, FetchOutcome};

use crate::state::AppState;

const DEFAULT_APPROVAL_NOTES: &str = "Approved via LMS";
const DEFAULT_RESOLUTION: &str = "Resolved via LMS investigation";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/kyc/{id}/approve", post(approve_kyc))
        .route("/api/alerts/{id}/resolve", post(resolve_alert))
        .route("/api/transactions/{id}/flag", post(flag_transaction))
        .route("/api/templates", post(create_template))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApproveRequest {
    notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResolveRequest {
    resolution: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlagRequest {
    reason: String,
}

#[derive(Debug, Serialize)]
struct Refreshed {
    resource: Resource,
    /// `updated`, `failed`, or `in_flight` when an earlier fetch was reused.
    outcome: &'static str,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ActionResponse {
    action: &'static str,
    result: serde_json::Value,
    refreshed: Vec<Refreshed>,
}

/// Validate, apply and wait for the follow-up refreshes.
async fn run(state: &AppState, action: Action) -> Result<Json<ActionResponse>, AppError> {
    action.validate().map_err(AppError::Validation)?;

    let report = state.actions.run(&action).await?;
    let action = report.action;
    let result = report.result.clone();

    let refreshed = report
        .wait_all()
        .await
        .into_iter()
        .map(|(resource, outcome)| {
            let (outcome, error) = match outcome {
                Some(FetchOutcome::Updated) => ("updated", None),
                Some(FetchOutcome::Failed(e)) => ("failed", Some(e.to_string())),
                None => ("in_flight", None),
            };
            Refreshed {
                resource,
                outcome,
                error,
            }
        })
        .collect();

    Ok(Json(ActionResponse {
        action,
        result,
        refreshed,
    }))
}

/// POST /api/kyc/:id/approve
async fn approve_kyc(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let notes = request
        .notes
        .unwrap_or_else(|| DEFAULT_APPROVAL_NOTES.to_string());
    run(
        &state,
        Action::ApproveKyc {
            application_id: id,
            notes: Some(notes),
        },
    )
    .await
}

/// POST /api/alerts/:id/resolve
async fn resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let resolution = request
        .resolution
        .unwrap_or_else(|| DEFAULT_RESOLUTION.to_string());
    run(
        &state,
        Action::ResolveAlert {
            alert_id: id,
            resolution,
        },
    )
    .await
}

/// POST /api/transactions/:id/flag: A reason is required.
async fn flag_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<FlagRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    run(
        &state,
        Action::FlagTransaction {
            transaction_id: id,
            reason: request.reason,
        },
    )
    .await
}

/// POST /api/templates
async fn create_template(
    State(state): State<AppState>,
    Json(template): Json<NewLimitTemplate>,
) -> Result<Json<ActionResponse>, AppError> {
    run(&state, Action::CreateTemplate(template)).await
}
