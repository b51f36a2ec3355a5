pub mod actions;
pub mod calculator;
pub mod dashboard;
pub mod events;
pub mod health;
pub mod resources;
pub mod transactions;
pub mod view;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(resources::router())
        .merge(view::router())
        .merge(events::router())
        .merge(transactions::router())
        .merge(dashboard::router())
        .merge(calculator::router())
        .merge(actions::router())
        .with_state(state)
}
