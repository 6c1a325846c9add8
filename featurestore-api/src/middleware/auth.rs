use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::TenantTag;
use crate::error::ApiError;
use crate::state::AppState;

/// Extension inserted into the request by [`auth_middleware`] so handlers
/// can read the caller's tenant tag without re-parsing the header.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub tenant: TenantTag,
}

fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get("X-API-Key").and_then(|v| v.to_str().ok())
}

/// Rejects requests with a missing or unknown `X-API-Key` with 401 before
/// any handler runs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let api_key = extract_api_key(request.headers());
    let tenant = state
        .auth
        .authenticate(api_key)
        .ok_or(ApiError::Unauthenticated)?;
    request.extensions_mut().insert(AuthContext { tenant });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use crate::config::ApiConfig;
    use crate::serving::ServingEngine;
    use crate::write_path::WritePath;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use std::sync::Arc;
    use std::time::Instant;
    use tower::ServiceExt; // for `oneshot`

    fn test_state() -> AppState {
        let cache = Arc::new(featurestore_test_utils::MockCache::new());
        let store = Arc::new(featurestore_test_utils::MockStore::new());
        let registry = Arc::new(featurestore_test_utils::MockRegistry::new());
        let mut keys = std::collections::HashMap::new();
        keys.insert("test_key_123".to_string(), TenantTag("acme".to_string()));
        AppState {
            serving: Arc::new(ServingEngine::new(cache, store, 300)),
            write_path: Arc::new(WritePath::new(Arc::new(
                featurestore_test_utils::MockStore::new(),
            ))),
            registry,
            auth: Arc::new(AuthConfig::new(keys)),
            config: Arc::new(ApiConfig::default()),
            start_time: Instant::now(),
        }
    }

    fn test_app() -> Router {
        let state = test_state();
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                state,
                auth_middleware,
            ))
    }

    #[tokio::test]
    async fn valid_api_key_passes_through() {
        let request = Request::builder()
            .uri("/protected")
            .header("X-API-Key", "test_key_123")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_api_key_is_rejected() {
        let request = Request::builder()
            .uri("/protected")
            .header("X-API-Key", "nope")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_api_key_is_rejected() {
        let request = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
