use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{RegisterFeatureRequest, RegisterFeatureResponse};
use crate::validation::validate_register_request;

/// `POST /api/v1/features/register`
pub async fn register_feature(
    State(state): State<AppState>,
    Json(req): Json<RegisterFeatureRequest>,
) -> ApiResult<Json<RegisterFeatureResponse>> {
    validate_register_request(&req).map_err(featurestore_core::FeatureStoreError::Validation)?;

    let (feature_id, created_at) = state
        .registry
        .register(
            &req.name,
            req.version,
            req.dtype,
            &req.entity_type,
            req.ttl_hours,
            &req.description,
            req.tags,
        )
        .await
        .map_err(featurestore_core::FeatureStoreError::from)?;

    Ok(Json(RegisterFeatureResponse {
        feature_id,
        name: req.name,
        version: req.version,
        status: "registered",
        created_at,
    }))
}
