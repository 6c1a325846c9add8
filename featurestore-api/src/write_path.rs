//! Write path: idempotent batch upsert into the durable store.
//!
//! The whole batch commits in a single transaction; a successful write does
//! not proactively refresh the cache. Cache invalidation is the external
//! pipeline's job via `DELETE /api/v1/cache/invalidate/{entity_id}`, which
//! keeps this path independent of the cache tier's availability.

use std::sync::Arc;

use featurestore_core::{FeatureStoreError, StoredFeatureValue};
use featurestore_storage::DurableStore;

pub struct WritePath {
    store: Arc<dyn DurableStore>,
}

impl WritePath {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Write a batch of feature values. The caller (an external streaming
    /// pipeline) is responsible for knowing each row's `feature_id` —
    /// the store does not cross-check it against the registry on every
    /// write, for throughput (see DESIGN.md).
    pub async fn write_features(
        &self,
        batch: &[StoredFeatureValue],
    ) -> Result<(), FeatureStoreError> {
        self.store.write_features(batch).await.map_err(|err| {
            match err {
                featurestore_core::StoreError::WriteFailed(msg) => {
                    FeatureStoreError::WriteFailed(msg)
                }
                other => FeatureStoreError::StoreUnavailable(other),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use featurestore_core::{EntityId, FeatureId, FeatureValueData, StoreError, Timestamp};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockStore {
        written: Mutex<Vec<StoredFeatureValue>>,
        fail_with: Option<StoreError>,
    }

    #[async_trait]
    impl DurableStore for MockStore {
        async fn get_features(
            &self,
            _entity_ids: &[EntityId],
            _feature_names: &[String],
            _as_of: Timestamp,
        ) -> Result<HashMap<EntityId, HashMap<String, StoredFeatureValue>>, StoreError> {
            Ok(HashMap::new())
        }

        async fn write_features(&self, batch: &[StoredFeatureValue]) -> Result<(), StoreError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.written.lock().unwrap().extend_from_slice(batch);
            Ok(())
        }

        async fn get_feature_history(
            &self,
            _entity_id: &EntityId,
            _feature_name: &str,
            _start: Timestamp,
            _end: Timestamp,
        ) -> Result<Vec<StoredFeatureValue>, StoreError> {
            Ok(Vec::new())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn row() -> StoredFeatureValue {
        StoredFeatureValue {
            feature_id: FeatureId(1),
            entity_id: EntityId("u1".to_string()),
            timestamp: Utc::now(),
            value: FeatureValueData::Int64(1),
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn write_failure_surfaces_as_write_failed() {
        let store = Arc::new(MockStore {
            fail_with: Some(StoreError::WriteFailed("rolled back".into())),
            ..Default::default()
        });
        let path = WritePath::new(store);
        let err = path.write_features(&[row()]).await.unwrap_err();
        assert!(matches!(err, FeatureStoreError::WriteFailed(_)));
    }

    #[tokio::test]
    async fn pool_exhaustion_surfaces_as_store_unavailable() {
        let store = Arc::new(MockStore {
            fail_with: Some(StoreError::PoolExhausted),
            ..Default::default()
        });
        let path = WritePath::new(store);
        let err = path.write_features(&[row()]).await.unwrap_err();
        assert!(matches!(err, FeatureStoreError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn successful_write_persists_the_batch() {
        let store = Arc::new(MockStore::default());
        let path = WritePath::new(store.clone());
        path.write_features(&[row()]).await.unwrap();
        assert_eq!(store.written.lock().unwrap().len(), 1);
    }
}
