//! Filtered transaction monitoring view.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use lms_common::error::AppError;
use lms_common::models::Transaction;
use lms_common::types::Resource;
use lms_engine::matcher::TransactionFilter;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/transactions", get(list_transactions))
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub status: Option<String>,
    pub risk_level: Option<String>,
    pub timeframe: Option<String>,
}

#[derive(Debug, Serialize)]
struct TransactionList {
    count: usize,
    stale: bool,
    results: Vec<Transaction>,
}

/// GET /api/transactions: Cached transactions matching the filters.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<TransactionList>, AppError> {
    let filter = TransactionFilter::parse(
        query.status.as_deref(),
        query.risk_level.as_deref(),
        query.timeframe.as_deref(),
    )
    .map_err(AppError::Validation)?;

    let results = state
        .sync
        .data(Resource::Transactions)
        .map(|payload| filter.filter_payload(&payload, Utc::now()))
        .unwrap_or_default();

    Ok(Json(TransactionList {
        count: results.len(),
        stale: state.sync.is_stale(Resource::Transactions),
        results,
    }))
}
