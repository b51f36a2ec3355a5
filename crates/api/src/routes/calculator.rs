use axum::routing::post;
use axum::{Json, Router};

use lms_common::error::AppError;
use lms_engine::calculator::{Calculation, CalculatorRequest};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/calculator", post(calculate))
}

/// POST /api/calculator: One-shot trading calculation.
async fn calculate(Json(request): Json<CalculatorRequest>) -> Result<Json<Calculation>, AppError> {
    request
        .evaluate()
        .map(Json)
        .map_err(|e| AppError::Validation(e.to_string()))
}
