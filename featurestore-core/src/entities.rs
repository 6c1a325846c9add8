//! Core domain structures: registered feature schemas and stored/cached values.

use crate::dtype::{DType, FeatureValueData};
use crate::ids::{EntityId, FeatureId, Timestamp};
use serde::{Deserialize, Serialize};

/// A registered feature schema: the `(name, version)` contract every stored
/// value for this feature conforms to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeatureSchema {
    pub feature_id: FeatureId,
    pub name: String,
    pub version: u32,
    pub dtype: DType,
    pub entity_type: String,
    pub ttl_hours: u32,
    pub description: String,
    pub tags: Option<Vec<String>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A single feature value as it lives in the durable store, keyed by
/// `(feature_id, entity_id, timestamp)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StoredFeatureValue {
    pub feature_id: FeatureId,
    pub entity_id: EntityId,
    pub timestamp: Timestamp,
    pub value: FeatureValueData,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// A feature value as it lives in the cache: the same payload the durable
/// store holds, plus the freshness window the serving engine needs to
/// decide whether the entry is still usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedFeature {
    pub value: FeatureValueData,
    pub timestamp: Timestamp,
    /// Seconds between `timestamp` and the moment this entry was cached.
    pub freshness_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn cached_feature_serializes_and_round_trips() {
        let entry = CachedFeature {
            value: FeatureValueData::Float64(3.5),
            timestamp: Utc::now(),
            freshness_seconds: 12,
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: CachedFeature = serde_json::from_str(&json).unwrap();
        assert_eq!(back.freshness_seconds, 12);
    }
}
