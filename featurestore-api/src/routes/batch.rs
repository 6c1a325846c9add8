use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{BatchFeatureRequest, BatchFeatureResponse};
use crate::validation::validate_batch_request;

/// `POST /api/v1/features/batch`
pub async fn batch_read(
    State(state): State<AppState>,
    Json(req): Json<BatchFeatureRequest>,
) -> ApiResult<Json<BatchFeatureResponse>> {
    validate_batch_request(&req, state.config.max_batch_size)
        .map_err(featurestore_core::FeatureStoreError::Validation)?;

    let resp = state
        .serving
        .batch_read(&req.entity_ids, &req.feature_names, req.timestamp)
        .await?;
    Ok(Json(resp))
}
