use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{OnlineFeatureRequest, OnlineFeatureResponse};
use crate::validation::validate_online_request;

/// `POST /api/v1/features/online`
pub async fn online_read(
    State(state): State<AppState>,
    Json(req): Json<OnlineFeatureRequest>,
) -> ApiResult<Json<OnlineFeatureResponse>> {
    validate_online_request(&req).map_err(featurestore_core::FeatureStoreError::Validation)?;

    let resp = state
        .serving
        .online_read(&req.entity_id, &req.feature_names)
        .await?;
    Ok(Json(resp))
}
