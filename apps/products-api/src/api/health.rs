//! Health, readiness and metrics endpoints

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    name: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ReadyResponse {
    ready: bool,
    database: bool,
    cache: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        name: state.app.name,
        version: state.app.version,
    })
}

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let Some(backends) = state.backends else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                ready: false,
                database: false,
                cache: false,
            }),
        );
    };

    let (database, cache) = tokio::join!(
        database::mongodb::ping(&backends.mongo_client, &backends.mongo_database),
        database::redis::ping(&backends.redis),
    );
    for (name, result) in [("database", &database), ("cache", &cache)] {
        if let Err(e) = result {
            tracing::error!(check = name, error = %e, "Readiness check failed");
        }
    }

    let body = ReadyResponse {
        ready: database.is_ok() && cache.is_ok(),
        database: database.is_ok(),
        cache: cache.is_ok(),
    };
    let status = if body.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        stream_worker::render_metrics(),
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .with_state(state)
}
