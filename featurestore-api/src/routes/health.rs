//! `GET /health` — a liveness probe that always returns 200 once the
//! process is up. `GET /ready` — a readiness probe that actually checks the
//! cache and store connections and returns 503 if either is down.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::state::AppState;
use crate::types::{HealthResponse, ReadyResponse};

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now(),
    })
}

pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.serving.store_ping().await;
    let cache = state.serving.cache_ping().await;

    let body = ReadyResponse {
        status: if database && cache { "ready" } else { "not_ready" },
        database,
        cache,
    };

    if database && cache {
        (StatusCode::OK, Json(body))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(body))
    }
}
