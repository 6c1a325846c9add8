use async_trait::async_trait;
use featurestore_core::{EntityId, StoreError, StoredFeatureValue, Timestamp};
use std::collections::HashMap;

/// Durable, time-series feature table with point-in-time query support
/// Backed by PostgreSQL; every operation runs through a bounded
/// connection pool with a per-query command timeout.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Point-in-time read: for each `(entity_id, feature_name)` pair,
    /// returns the row with the greatest `timestamp <= as_of`. Pairs with
    /// no such row are omitted from the result entirely (absent rather
    /// than null).
    async fn get_features(
        &self,
        entity_ids: &[EntityId],
        feature_names: &[String],
        as_of: Timestamp,
    ) -> Result<HashMap<EntityId, HashMap<String, StoredFeatureValue>>, StoreError>;

    /// Idempotent batch upsert keyed by `(feature_id, entity_id,
    /// timestamp)`. The whole batch commits in a single transaction; any
    /// row failure rolls back the entire batch.
    async fn write_features(&self, batch: &[StoredFeatureValue]) -> Result<(), StoreError>;

    /// Ascending, inclusive-bounds history for one entity/feature pair.
    async fn get_feature_history(
        &self,
        entity_id: &EntityId,
        feature_name: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<StoredFeatureValue>, StoreError>;

    /// Liveness probe used by `/ready`.
    async fn ping(&self) -> Result<(), StoreError>;
}
