//! Serving engine — the heart of the core.
//!
//! Cache-first merge with database fallback on the online path,
//! point-in-time batch reads that bypass the cache entirely, and delegated
//! invalidation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use featurestore_core::{CachedFeature, EntityId, FeatureStoreError, StoreError, Timestamp};
use featurestore_storage::cache::{cache_key, invalidate_pattern};
use featurestore_storage::{CacheBackend, DurableStore};

use crate::telemetry::METRICS;
use crate::types::{
    BatchFeatureResponse, BatchFeatureValue, FeatureReading, OnlineFeatureResponse, Source,
};

/// The per-request progression of an online read. Logged at each
/// transition (`tracing::debug!`); `CacheBackfill` is terminal in the
/// background and never blocks `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestState {
    Received,
    CacheRead,
    NeedStore,
    StoreRead,
    CacheBackfill,
    Complete,
    Failed,
}

fn transition(from: RequestState, to: RequestState) {
    tracing::debug!(?from, ?to, "serving engine state transition");
}

pub struct ServingEngine {
    cache: Arc<dyn CacheBackend>,
    store: Arc<dyn DurableStore>,
    cache_ttl_seconds: u64,
}

impl ServingEngine {
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        store: Arc<dyn DurableStore>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            cache,
            store,
            cache_ttl_seconds,
        }
    }

    /// Online read: batched cache lookup, database fallback for misses,
    /// fire-and-forget cache backfill.
    pub async fn online_read(
        &self,
        entity_id: &str,
        feature_names: &[String],
    ) -> Result<OnlineFeatureResponse, FeatureStoreError> {
        let mut state = RequestState::Received;
        transition(state, RequestState::CacheRead);
        state = RequestState::CacheRead;

        // Step 1-2: build keys in input order, issue one batched cache read.
        let keys: Vec<String> = feature_names
            .iter()
            .map(|name| cache_key(entity_id, name))
            .collect();
        let cache_results = self.cache.get_many(&keys).await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "cache get_many failed, treating as all-absent");
            vec![None; keys.len()]
        });

        // Step 3: accumulate hits, collect misses.
        let mut features: HashMap<String, FeatureReading> = HashMap::new();
        let mut missing: Vec<String> = Vec::new();
        for (name, hit) in feature_names.iter().zip(cache_results.into_iter()) {
            match hit {
                Some(CachedFeature {
                    value,
                    timestamp,
                    freshness_seconds,
                }) => {
                    features.insert(
                        name.clone(),
                        FeatureReading {
                            value,
                            timestamp,
                            freshness_seconds,
                        },
                    );
                }
                None => missing.push(name.clone()),
            }
        }

        if missing.is_empty() {
            transition(state, RequestState::Complete);
            METRICS.feature_reads_total.with_label_values(&["cache"]).inc();
            return Ok(OnlineFeatureResponse {
                entity_id: entity_id.to_string(),
                features,
                served_at: Utc::now(),
                source: Source::Cache,
                all_from_cache: true,
            });
        }

        // Step 4: query the durable store for misses only.
        transition(state, RequestState::NeedStore);
        state = RequestState::NeedStore;
        transition(state, RequestState::StoreRead);
        state = RequestState::StoreRead;

        let now = Utc::now();
        let timer = std::time::Instant::now();
        let store_result = self
            .store
            .get_features(&[EntityId(entity_id.to_string())], &missing, now)
            .await;
        METRICS
            .db_query_duration_seconds
            .with_label_values(&["get_features"])
            .observe(timer.elapsed().as_secs_f64());

        let store_rows = match store_result {
            Ok(rows) => rows,
            Err(err) => {
                transition(state, RequestState::Failed);
                // A store error only fails the request if there are still
                // missing features after the cache step. Since `missing` is
                // non-empty here by construction, it always fails — the
                // "cache fully satisfied" case returned above before this
                // point was ever reached.
                return Err(FeatureStoreError::StoreUnavailable(err));
            }
        };

        let entity_rows = store_rows
            .get(&EntityId(entity_id.to_string()))
            .cloned()
            .unwrap_or_default();

        let missed_every_feature = missing.len() == feature_names.len();
        let mut backfill_entries: Vec<(String, CachedFeature)> = Vec::new();
        for name in &missing {
            if let Some(stored) = entity_rows.get(name) {
                let freshness = (now - stored.timestamp).num_seconds().max(0);
                let reading = FeatureReading {
                    value: stored.value.clone(),
                    timestamp: stored.timestamp,
                    freshness_seconds: freshness,
                };
                let cache_record = CachedFeature {
                    value: reading.value.clone(),
                    timestamp: reading.timestamp,
                    freshness_seconds: freshness,
                };
                backfill_entries.push((cache_key(entity_id, name), cache_record));
                features.insert(name.clone(), reading);
            }
        }

        // Step 5: fire-and-forget backfill; never block the response on it.
        transition(state, RequestState::CacheBackfill);
        self.spawn_backfill(backfill_entries);

        // The source tag depends only on what the cache step found —
        // "database" when every requested feature was a cache miss, "mixed"
        // otherwise — independent of how many of the store lookups
        // themselves came back empty.
        let source = if missed_every_feature {
            Source::Database
        } else {
            Source::Mixed
        };

        transition(RequestState::CacheBackfill, RequestState::Complete);
        METRICS
            .feature_reads_total
            .with_label_values(&[source_label(source)])
            .inc();

        Ok(OnlineFeatureResponse {
            entity_id: entity_id.to_string(),
            features,
            served_at: now,
            source,
            all_from_cache: false,
        })
    }

    /// Liveness probes used by `/ready`.
    pub async fn cache_ping(&self) -> bool {
        self.cache.ping().await.is_ok()
    }

    pub async fn store_ping(&self) -> bool {
        self.store.ping().await.is_ok()
    }

    fn spawn_backfill(&self, entries: Vec<(String, CachedFeature)>) {
        if entries.is_empty() {
            return;
        }
        let cache = Arc::clone(&self.cache);
        let ttl = self.cache_ttl_seconds;
        tokio::spawn(async move {
            if let Err(err) = cache.set_many(&entries, ttl).await {
                tracing::warn!(error = %err, "cache backfill failed, best effort dropped");
            }
        });
    }

    /// Batch (training) read: point-in-time feature lookup. Bypasses the
    /// cache entirely.
    pub async fn batch_read(
        &self,
        entity_ids: &[String],
        feature_names: &[String],
        as_of: Option<Timestamp>,
    ) -> Result<BatchFeatureResponse, FeatureStoreError> {
        let as_of = as_of.unwrap_or_else(Utc::now);
        let ids: Vec<EntityId> = entity_ids.iter().map(|e| EntityId(e.clone())).collect();

        let timer = std::time::Instant::now();
        let rows = self
            .store
            .get_features(&ids, feature_names, as_of)
            .await
            .map_err(|err: StoreError| {
                // Batch-read store errors always fail — never a silent
                // partial result.
                FeatureStoreError::StoreUnavailable(err)
            })?;
        METRICS
            .db_query_duration_seconds
            .with_label_values(&["get_features_batch"])
            .observe(timer.elapsed().as_secs_f64());

        let mut features: HashMap<String, HashMap<String, BatchFeatureValue>> = HashMap::new();
        for (entity_id, by_feature) in rows {
            if by_feature.is_empty() {
                continue;
            }
            let entry = by_feature
                .into_iter()
                .map(|(name, stored)| {
                    (
                        name,
                        BatchFeatureValue {
                            value: stored.value,
                            timestamp: stored.timestamp,
                        },
                    )
                })
                .collect();
            features.insert(entity_id.0, entry);
        }

        let count = features.len();
        Ok(BatchFeatureResponse {
            features,
            as_of,
            count,
        })
    }

    /// Cache invalidation. Delegates to a pattern delete and surfaces the
    /// error (unlike read-path cache calls, this is an explicit mutation
    /// the caller asked for).
    pub async fn invalidate(&self, entity_id: &str) -> Result<u64, FeatureStoreError> {
        let pattern = invalidate_pattern(entity_id);
        match self.cache.invalidate(&pattern).await {
            Ok(count) => {
                METRICS.invalidations_total.with_label_values(&["ok"]).inc();
                Ok(count)
            }
            Err(err) => {
                METRICS
                    .invalidations_total
                    .with_label_values(&["error"])
                    .inc();
                Err(FeatureStoreError::Unexpected(format!(
                    "cache invalidation failed: {err}"
                )))
            }
        }
    }
}

fn source_label(source: Source) -> &'static str {
    match source {
        Source::Cache => "cache",
        Source::Database => "database",
        Source::Mixed => "mixed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use featurestore_core::{CacheError, FeatureValueData, StoredFeatureValue};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockCache {
        store: Mutex<HashMap<String, CachedFeature>>,
        fail_get: bool,
        set_calls: Mutex<Vec<Vec<(String, CachedFeature)>>>,
    }

    #[async_trait]
    impl CacheBackend for MockCache {
        async fn get_many(
            &self,
            keys: &[String],
        ) -> Result<Vec<Option<CachedFeature>>, CacheError> {
            if self.fail_get {
                return Err(CacheError::Unavailable("down".into()));
            }
            let store = self.store.lock().unwrap();
            Ok(keys.iter().map(|k| store.get(k).cloned()).collect())
        }

        async fn set_many(
            &self,
            entries: &[(String, CachedFeature)],
            _ttl_seconds: u64,
        ) -> Result<(), CacheError> {
            let mut store = self.store.lock().unwrap();
            for (k, v) in entries {
                store.insert(k.clone(), v.clone());
            }
            self.set_calls.lock().unwrap().push(entries.to_vec());
            Ok(())
        }

        async fn invalidate(&self, pattern: &str) -> Result<u64, CacheError> {
            let prefix = pattern.trim_end_matches('*');
            let mut store = self.store.lock().unwrap();
            let before = store.len();
            store.retain(|k, _| !k.starts_with(prefix));
            Ok((before - store.len()) as u64)
        }

        async fn ping(&self) -> Result<(), CacheError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockStore {
        rows: Vec<StoredFeatureValue>,
        query_count: Mutex<u32>,
        fail: bool,
    }

    #[async_trait]
    impl DurableStore for MockStore {
        async fn get_features(
            &self,
            entity_ids: &[EntityId],
            feature_names: &[String],
            as_of: Timestamp,
        ) -> Result<HashMap<EntityId, HashMap<String, StoredFeatureValue>>, StoreError> {
            *self.query_count.lock().unwrap() += 1;
            if self.fail {
                return Err(StoreError::Query("boom".into()));
            }
            let mut result: HashMap<EntityId, HashMap<String, StoredFeatureValue>> =
                HashMap::new();
            for row in &self.rows {
                if !entity_ids.contains(&row.entity_id) {
                    continue;
                }
                // emulate DISTINCT ON: the feature_names passed in are
                // names, but our mock rows only carry feature_id, so tests
                // key by feature_id.to_string() as the "name" for simplicity.
                let name = row.feature_id.to_string();
                if !feature_names.contains(&name) || row.timestamp > as_of {
                    continue;
                }
                let entry = result.entry(row.entity_id.clone()).or_default();
                match entry.get(&name) {
                    Some(existing) if existing.timestamp >= row.timestamp => {}
                    _ => {
                        entry.insert(name, row.clone());
                    }
                }
            }
            Ok(result)
        }

        async fn write_features(&self, _batch: &[StoredFeatureValue]) -> Result<(), StoreError> {
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

    fn stored(feature_id: i64, entity: &str, ts: Timestamp, value: f64) -> StoredFeatureValue {
        StoredFeatureValue {
            feature_id: featurestore_core::FeatureId(feature_id),
            entity_id: EntityId(entity.to_string()),
            timestamp: ts,
            value: FeatureValueData::Float64(value),
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn cold_read_goes_to_store_and_backfills_cache() {
        let ts = Utc::now() - chrono::Duration::seconds(5);
        let store = Arc::new(MockStore {
            rows: vec![stored(1, "u42", ts, 30.0)],
            ..Default::default()
        });
        let cache = Arc::new(MockCache::default());
        let engine = ServingEngine::new(cache.clone(), store.clone(), 3600);

        let resp = engine
            .online_read("u42", &["1".to_string()])
            .await
            .unwrap();

        assert_eq!(resp.source, Source::Database);
        assert!(!resp.all_from_cache);
        assert_eq!(resp.features.len(), 1);
        assert_eq!(*store.query_count.lock().unwrap(), 1);

        // allow the spawned backfill task to run
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(cache.store.lock().unwrap().contains_key("u42:1"));
    }

    #[tokio::test]
    async fn warm_read_never_touches_store() {
        let ts = Utc::now();
        let cache = Arc::new(MockCache::default());
        cache.store.lock().unwrap().insert(
            "u42:1".to_string(),
            CachedFeature {
                value: FeatureValueData::Float64(30.0),
                timestamp: ts,
                freshness_seconds: 0,
            },
        );
        let store = Arc::new(MockStore::default());
        let engine = ServingEngine::new(cache, store.clone(), 3600);

        let resp = engine
            .online_read("u42", &["1".to_string()])
            .await
            .unwrap();

        assert_eq!(resp.source, Source::Cache);
        assert!(resp.all_from_cache);
        assert_eq!(*store.query_count.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn mixed_read_queries_store_only_for_misses() {
        let ts = Utc::now();
        let cache = Arc::new(MockCache::default());
        cache.store.lock().unwrap().insert(
            "u42:1".to_string(),
            CachedFeature {
                value: FeatureValueData::Float64(30.0),
                timestamp: ts,
                freshness_seconds: 0,
            },
        );
        let store = Arc::new(MockStore {
            rows: vec![stored(2, "u42", ts, 99.0)],
            ..Default::default()
        });
        let engine = ServingEngine::new(cache, store.clone(), 3600);

        let resp = engine
            .online_read("u42", &["1".to_string(), "2".to_string()])
            .await
            .unwrap();

        assert_eq!(resp.source, Source::Mixed);
        assert_eq!(resp.features.len(), 2);
    }

    #[tokio::test]
    async fn cache_error_falls_back_to_store_as_a_miss() {
        let store = Arc::new(MockStore {
            rows: vec![stored(1, "u42", Utc::now(), 1.0)],
            ..Default::default()
        });
        let cache = Arc::new(MockCache {
            fail_get: true,
            ..Default::default()
        });
        let engine = ServingEngine::new(cache, store, 3600);

        let resp = engine
            .online_read("u42", &["1".to_string()])
            .await
            .unwrap();
        assert_eq!(resp.source, Source::Database);
    }

    #[tokio::test]
    async fn missing_feature_is_silently_omitted_not_an_error() {
        let store = Arc::new(MockStore::default());
        let cache = Arc::new(MockCache::default());
        let engine = ServingEngine::new(cache, store, 3600);

        let resp = engine
            .online_read("u42", &["missing".to_string()])
            .await
            .unwrap();
        assert!(resp.features.is_empty());
    }

    #[tokio::test]
    async fn store_error_surfaces_only_when_features_are_still_missing() {
        let store = Arc::new(MockStore {
            fail: true,
            ..Default::default()
        });
        let cache = Arc::new(MockCache::default());
        let engine = ServingEngine::new(cache, store, 3600);

        let err = engine
            .online_read("u42", &["1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, FeatureStoreError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn batch_read_bypasses_cache_and_always_hits_store() {
        let ts_early = Utc::now() - chrono::Duration::hours(2);
        let ts_late = Utc::now() - chrono::Duration::hours(1);
        let store = Arc::new(MockStore {
            rows: vec![
                stored(1, "u1", ts_early, 10.0),
                stored(1, "u1", ts_late, 20.0),
            ],
            ..Default::default()
        });
        let cache = Arc::new(MockCache::default());
        let engine = ServingEngine::new(cache, store.clone(), 3600);

        let resp = engine
            .batch_read(
                &["u1".to_string()],
                &["1".to_string()],
                Some(ts_early + chrono::Duration::minutes(1)),
            )
            .await
            .unwrap();

        assert_eq!(resp.count, 1);
        let value = &resp.features["u1"]["1"];
        assert_eq!(value.value, FeatureValueData::Float64(10.0));
        assert_eq!(*store.query_count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn invalidate_delegates_to_cache_and_returns_advisory_count() {
        let cache = Arc::new(MockCache::default());
        cache.store.lock().unwrap().insert(
            "u7:a".to_string(),
            CachedFeature {
                value: FeatureValueData::Bool(true),
                timestamp: Utc::now(),
                freshness_seconds: 0,
            },
        );
        cache.store.lock().unwrap().insert(
            "u7:b".to_string(),
            CachedFeature {
                value: FeatureValueData::Bool(false),
                timestamp: Utc::now(),
                freshness_seconds: 0,
            },
        );
        let store = Arc::new(MockStore::default());
        let engine = ServingEngine::new(cache.clone(), store, 3600);

        let count = engine.invalidate("u7").await.unwrap();
        assert_eq!(count, 2);
        assert!(cache.store.lock().unwrap().is_empty());
    }
}
