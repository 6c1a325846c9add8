//! HTTP-facing error type.
//!
//! Wraps [`featurestore_core::FeatureStoreError`] with a status-code
//! mapping: `ValidationError` -> 400, `AuthError` -> 401, `NotFound` -> 404
//! (metadata endpoints only), `StoreUnavailable` / `RegistryUnavailable` ->
//! 503, `WriteFailed` -> its own code (the client is expected to retry),
//! anything else -> 500.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use featurestore_core::FeatureStoreError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    AuthFailed,
    NotFound,
    StoreUnavailable,
    RegistryUnavailable,
    WriteFailed,
    Unexpected,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

/// Top-level error type returned by every HTTP handler.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] FeatureStoreError),

    #[error("missing or unknown API key")]
    Unauthenticated,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn code_and_status(&self) -> (ErrorCode, StatusCode) {
        match self {
            ApiError::Unauthenticated => (ErrorCode::AuthFailed, StatusCode::UNAUTHORIZED),
            ApiError::Store(FeatureStoreError::Validation(_)) => {
                (ErrorCode::ValidationFailed, StatusCode::BAD_REQUEST)
            }
            ApiError::Store(FeatureStoreError::Auth) => {
                (ErrorCode::AuthFailed, StatusCode::UNAUTHORIZED)
            }
            ApiError::Store(FeatureStoreError::NotFound(_)) => {
                (ErrorCode::NotFound, StatusCode::NOT_FOUND)
            }
            ApiError::Store(FeatureStoreError::StoreUnavailable(_)) => {
                (ErrorCode::StoreUnavailable, StatusCode::SERVICE_UNAVAILABLE)
            }
            ApiError::Store(FeatureStoreError::RegistryUnavailable(_)) => (
                ErrorCode::RegistryUnavailable,
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            ApiError::Store(FeatureStoreError::WriteFailed(_)) => {
                (ErrorCode::WriteFailed, StatusCode::SERVICE_UNAVAILABLE)
            }
            ApiError::Store(FeatureStoreError::Unexpected(_)) => {
                (ErrorCode::Unexpected, StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, status) = self.code_and_status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "unexpected error");
        } else {
            tracing::warn!(error = %self, ?status, "request failed");
        }
        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert("WWW-Authenticate", HeaderValue::from_static("ApiKey"));
        }
        response
    }
}
