use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use lms_common::error::AppError;
use lms_common::types::Resource;
use lms_engine::analyzer::{self, RiskSummary};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard/risk", get(risk_summary))
}

/// GET /api/dashboard/risk: Risk distribution of the cached dashboard.
async fn risk_summary(State(state): State<AppState>) -> Result<Json<RiskSummary>, AppError> {
    let payload = state
        .sync
        .data(Resource::Dashboard)
        .ok_or_else(|| AppError::NotFound("dashboard has not been fetched yet".to_string()))?;

    Ok(Json(analyzer::dashboard_summary(&payload)))
}
