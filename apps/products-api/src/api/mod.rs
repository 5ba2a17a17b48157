//! API routes module

pub mod health;

use axum::Router;
use domain_products::handlers;

use crate::state::AppState;

/// Products under `/api/v1/products`, plus health and metrics at the root.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/products", handlers::router(state.use_case.clone()))
        .merge(health::router(state))
}
