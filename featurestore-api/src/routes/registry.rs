use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::ListFeaturesResponse;
use featurestore_core::{FeatureSchema, FeatureStoreError};

#[derive(Debug, Deserialize)]
pub struct ListFeaturesQuery {
    pub entity_type: Option<String>,
}

/// `GET /api/v1/features`
pub async fn list_features(
    State(state): State<AppState>,
    Query(query): Query<ListFeaturesQuery>,
) -> ApiResult<Json<ListFeaturesResponse>> {
    let features = state
        .registry
        .list_features(query.entity_type.as_deref())
        .await
        .map_err(FeatureStoreError::from)?;

    Ok(Json(ListFeaturesResponse {
        count: features.len(),
        features,
    }))
}

#[derive(Debug, Deserialize)]
pub struct GetFeatureQuery {
    pub version: Option<u32>,
}

/// `GET /api/v1/features/{name}`
pub async fn get_feature(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<GetFeatureQuery>,
) -> ApiResult<Json<FeatureSchema>> {
    let schema = state
        .registry
        .get_feature(&name, query.version)
        .await
        .map_err(FeatureStoreError::from)?
        .ok_or_else(|| FeatureStoreError::NotFound(format!("feature '{name}' is not registered")))?;

    Ok(Json(schema))
}
