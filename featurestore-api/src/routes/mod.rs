//! HTTP surface assembly: the full `/api/v1` endpoint table plus the
//! unauthenticated health/metrics surface.

mod batch;
mod health;
mod invalidate;
mod online;
mod register;
mod registry;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::auth_middleware;
use crate::state::AppState;
use crate::telemetry::metrics_handler;

/// Builds the full router: `/health`, `/ready`, and `/metrics` are reachable
/// without an API key, everything under `/api/v1` requires one.
pub fn build_router(state: AppState) -> Router {
    let api_v1 = Router::new()
        .route("/features/online", post(online::online_read))
        .route("/features/batch", post(batch::batch_read))
        .route("/features/register", post(register::register_feature))
        .route("/features", get(registry::list_features))
        .route("/features/:name", get(registry::get_feature))
        .route(
            "/cache/invalidate/:entity_id",
            delete(invalidate::invalidate_entity),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api_v1);

    #[cfg(feature = "openapi")]
    let router = {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;
        router.merge(
            SwaggerUi::new("/swagger-ui").url("/openapi.json", crate::openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
