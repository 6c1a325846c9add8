//! JSON wire shapes for the `/api/v1` surface.
//!
//! These are deliberately distinct from `featurestore_core`'s domain types
//! (`FeatureSchema`, `StoredFeatureValue`, `CachedFeature`) — the wire
//! contract and the storage representation are allowed to diverge even
//! where they look similar today.

use chrono::{DateTime, Utc};
use featurestore_core::{DType, FeatureId, FeatureValueData};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `source` tag on an online-read response. Three-way: `Mixed` is reported
/// whenever the cache satisfied part but not all of the request, distinct
/// from the all-cache and all-database cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Database,
    Mixed,
}

/// `POST /api/v1/features/online` request body.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OnlineFeatureRequest {
    pub entity_id: String,
    pub feature_names: Vec<String>,
}

/// One feature reading inside an online-read response.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeatureReading {
    pub value: FeatureValueData,
    pub timestamp: DateTime<Utc>,
    pub freshness_seconds: i64,
}

/// `POST /api/v1/features/online` response body.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OnlineFeatureResponse {
    pub entity_id: String,
    pub features: HashMap<String, FeatureReading>,
    pub served_at: DateTime<Utc>,
    pub source: Source,
    pub all_from_cache: bool,
}

/// `POST /api/v1/features/batch` request body.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BatchFeatureRequest {
    pub entity_ids: Vec<String>,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// One feature value inside a batch-read response — no `freshness_seconds`,
/// since batch reads may surface arbitrarily old historical rows for
/// training and freshness is meaningless there.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BatchFeatureValue {
    pub value: FeatureValueData,
    pub timestamp: DateTime<Utc>,
}

/// `POST /api/v1/features/batch` response body.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BatchFeatureResponse {
    pub features: HashMap<String, HashMap<String, BatchFeatureValue>>,
    pub as_of: DateTime<Utc>,
    pub count: usize,
}

/// `POST /api/v1/features/register` request body.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterFeatureRequest {
    pub name: String,
    pub version: u32,
    pub dtype: DType,
    pub entity_type: String,
    pub ttl_hours: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// `POST /api/v1/features/register` response body.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterFeatureResponse {
    pub feature_id: FeatureId,
    pub name: String,
    pub version: u32,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
}

/// `GET /api/v1/features` response body.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListFeaturesResponse {
    pub features: Vec<featurestore_core::FeatureSchema>,
    pub count: usize,
}

/// `DELETE /api/v1/cache/invalidate/{entity_id}` response body.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InvalidateResponse {
    pub status: &'static str,
    pub entity_id: String,
    pub invalidated_count: u64,
}

/// `GET /health` response body.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// `GET /ready` response body.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: bool,
    pub cache: bool,
}
