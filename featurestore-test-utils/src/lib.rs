//! Shared test infrastructure for the feature store workspace:
//! proptest generators, fixtures, in-memory mock backends, and assertions.

pub use featurestore_core::{
    CacheError, CachedFeature, DType, EntityId, FeatureId, FeatureSchema, FeatureStoreError,
    FeatureValueData, RegistryError, StoreError, StoredFeatureValue, Timestamp,
};

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use featurestore_storage::{CacheBackend, DurableStore, Registry};

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    /// Generate a short, printable entity id (e.g. a user id).
    pub fn arb_entity_id() -> impl Strategy<Value = EntityId> {
        "[a-z][a-z0-9_-]{0,15}".prop_map(EntityId::from)
    }

    /// Generate a feature name (snake_case-ish, non-empty).
    pub fn arb_feature_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,30}"
    }

    pub fn arb_feature_id() -> impl Strategy<Value = FeatureId> {
        (1i64..1_000_000).prop_map(FeatureId)
    }

    pub fn arb_dtype() -> impl Strategy<Value = DType> {
        prop_oneof![
            Just(DType::Float64),
            Just(DType::Int64),
            Just(DType::String),
            Just(DType::Bool),
        ]
    }

    /// Generate a [`FeatureValueData`] matching the given declared dtype.
    pub fn arb_value_for_dtype(dtype: DType) -> impl Strategy<Value = FeatureValueData> {
        match dtype {
            DType::Float64 => any::<f64>().prop_map(FeatureValueData::Float64).boxed(),
            DType::Int64 => any::<i64>().prop_map(FeatureValueData::Int64).boxed(),
            DType::String => "[a-zA-Z0-9 ]{0,64}"
                .prop_map(FeatureValueData::String)
                .boxed(),
            DType::Bool => any::<bool>().prop_map(FeatureValueData::Bool).boxed(),
        }
    }

    pub fn arb_feature_value_data() -> impl Strategy<Value = FeatureValueData> {
        arb_dtype().prop_flat_map(arb_value_for_dtype)
    }

    /// Generate a timestamp within a fixed, reasonable window (2020-2030),
    /// avoiding the need for `Utc::now()` inside a strategy.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800i64..1_893_456_000i64)
            .prop_map(|secs| chrono::DateTime::from_timestamp(secs, 0).unwrap())
    }

    pub fn arb_feature_schema() -> impl Strategy<Value = FeatureSchema> {
        (
            arb_feature_id(),
            arb_feature_name(),
            1u32..5,
            arb_dtype(),
            "[a-z]{3,12}",
            1u32..720,
            arb_timestamp(),
        )
            .prop_map(
                |(feature_id, name, version, dtype, entity_type, ttl_hours, created_at)| {
                    FeatureSchema {
                        feature_id,
                        name,
                        version,
                        dtype,
                        entity_type,
                        ttl_hours,
                        description: String::new(),
                        tags: None,
                        created_at,
                        updated_at: created_at,
                    }
                },
            )
    }

    pub fn arb_stored_feature_value() -> impl Strategy<Value = StoredFeatureValue> {
        (
            arb_feature_id(),
            arb_entity_id(),
            arb_timestamp(),
            arb_feature_value_data(),
        )
            .prop_map(|(feature_id, entity_id, timestamp, value)| StoredFeatureValue {
                feature_id,
                entity_id,
                timestamp,
                value,
                metadata: serde_json::Map::new(),
            })
    }

    pub fn arb_cached_feature() -> impl Strategy<Value = CachedFeature> {
        (arb_feature_value_data(), arb_timestamp(), 0i64..86_400).prop_map(
            |(value, timestamp, freshness_seconds)| CachedFeature {
                value,
                timestamp,
                freshness_seconds,
            },
        )
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;
    use chrono::Utc;

    /// A registered `user.age` feature, version 1, 24h TTL.
    pub fn user_age_schema() -> FeatureSchema {
        FeatureSchema {
            feature_id: FeatureId(1),
            name: "user_age".to_string(),
            version: 1,
            dtype: DType::Int64,
            entity_type: "user".to_string(),
            ttl_hours: 24,
            description: "user age in years".to_string(),
            tags: Some(vec!["demographic".to_string()]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// A stored value for `user_age_schema`, entity `"u1"`, at `now`.
    pub fn user_age_value(entity_id: &str, age: i64) -> StoredFeatureValue {
        StoredFeatureValue {
            feature_id: FeatureId(1),
            entity_id: EntityId::from(entity_id),
            timestamp: Utc::now(),
            value: FeatureValueData::Int64(age),
            metadata: serde_json::Map::new(),
        }
    }

    pub fn fresh_cached_feature(value: FeatureValueData) -> CachedFeature {
        CachedFeature {
            value,
            timestamp: Utc::now(),
            freshness_seconds: 0,
        }
    }
}

// ============================================================================
// MOCK BACKENDS
// ============================================================================

/// In-memory [`CacheBackend`] for tests: plain `HashMap` behind a `Mutex`,
/// with optional forced failures to exercise degraded-cache call sites.
#[derive(Default)]
pub struct MockCache {
    entries: Mutex<HashMap<String, CachedFeature>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, key: impl Into<String>, value: CachedFeature) {
        self.entries.lock().unwrap().insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheBackend for MockCache {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<CachedFeature>>, CacheError> {
        if self.fail_reads {
            return Err(CacheError::Unavailable("mock cache read failure".into()));
        }
        let entries = self.entries.lock().unwrap();
        Ok(keys.iter().map(|k| entries.get(k).cloned()).collect())
    }

    async fn set_many(
        &self,
        entries: &[(String, CachedFeature)],
        _ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        if self.fail_writes {
            return Err(CacheError::Unavailable("mock cache write failure".into()));
        }
        let mut store = self.entries.lock().unwrap();
        for (key, value) in entries {
            store.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn invalidate(&self, pattern: &str) -> Result<u64, CacheError> {
        let prefix = pattern.trim_end_matches('*');
        let mut store = self.entries.lock().unwrap();
        let before = store.len();
        store.retain(|key, _| !key.starts_with(prefix));
        Ok((before - store.len()) as u64)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        if self.fail_reads && self.fail_writes {
            return Err(CacheError::Unavailable("mock cache unreachable".into()));
        }
        Ok(())
    }
}

/// In-memory [`DurableStore`] for tests, keyed the same way Postgres is:
/// `(feature_id, entity_id, timestamp)`, with point-in-time lookup.
#[derive(Default)]
pub struct MockStore {
    rows: Mutex<Vec<StoredFeatureValue>>,
    name_to_id: Mutex<HashMap<String, FeatureId>>,
    pub fail_with: Option<StoreError>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name -> id mapping so `get_features` can resolve feature
    /// names the way the real store does via a join against `features`.
    pub fn map_name(&self, name: impl Into<String>, id: FeatureId) {
        self.name_to_id.lock().unwrap().insert(name.into(), id);
    }

    pub fn seed(&self, value: StoredFeatureValue) {
        self.rows.lock().unwrap().push(value);
    }
}

#[async_trait]
impl DurableStore for MockStore {
    async fn get_features(
        &self,
        entity_ids: &[EntityId],
        feature_names: &[String],
        as_of: Timestamp,
    ) -> Result<HashMap<EntityId, HashMap<String, StoredFeatureValue>>, StoreError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        let name_to_id = self.name_to_id.lock().unwrap();
        let rows = self.rows.lock().unwrap();
        let mut out: HashMap<EntityId, HashMap<String, StoredFeatureValue>> = HashMap::new();

        for entity_id in entity_ids {
            for name in feature_names {
                let Some(feature_id) = name_to_id.get(name) else {
                    continue;
                };
                let latest = rows
                    .iter()
                    .filter(|r| {
                        &r.entity_id == entity_id
                            && r.feature_id == *feature_id
                            && r.timestamp <= as_of
                    })
                    .max_by_key(|r| r.timestamp);
                if let Some(row) = latest {
                    out.entry(entity_id.clone())
                        .or_default()
                        .insert(name.clone(), row.clone());
                }
            }
        }
        Ok(out)
    }

    async fn write_features(&self, batch: &[StoredFeatureValue]) -> Result<(), StoreError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        let mut rows = self.rows.lock().unwrap();
        for incoming in batch {
            if let Some(existing) = rows.iter_mut().find(|r| {
                r.feature_id == incoming.feature_id
                    && r.entity_id == incoming.entity_id
                    && r.timestamp == incoming.timestamp
            }) {
                existing.value = incoming.value.clone();
                existing.metadata = incoming.metadata.clone();
            } else {
                rows.push(incoming.clone());
            }
        }
        Ok(())
    }

    async fn get_feature_history(
        &self,
        entity_id: &EntityId,
        feature_name: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<StoredFeatureValue>, StoreError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        let name_to_id = self.name_to_id.lock().unwrap();
        let Some(feature_id) = name_to_id.get(feature_name) else {
            return Ok(Vec::new());
        };
        let rows = self.rows.lock().unwrap();
        let mut matches: Vec<_> = rows
            .iter()
            .filter(|r| {
                &r.entity_id == entity_id
                    && r.feature_id == *feature_id
                    && r.timestamp >= start
                    && r.timestamp <= end
            })
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.timestamp);
        Ok(matches)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(())
    }
}

/// In-memory [`Registry`] for tests, keyed by `(name, version)`.
pub struct MockRegistry {
    schemas: Mutex<Vec<FeatureSchema>>,
    next_id: Mutex<i64>,
    pub fail_with: Option<RegistryError>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            schemas: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
            fail_with: None,
        }
    }

    pub fn seed(&self, schema: FeatureSchema) {
        self.schemas.lock().unwrap().push(schema);
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn register(
        &self,
        name: &str,
        version: u32,
        dtype: DType,
        entity_type: &str,
        ttl_hours: u32,
        description: &str,
        tags: Option<Vec<String>>,
    ) -> Result<(FeatureId, Timestamp), RegistryError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        let now = chrono::Utc::now();
        let mut schemas = self.schemas.lock().unwrap();
        if let Some(existing) = schemas
            .iter_mut()
            .find(|s| s.name == name && s.version == version)
        {
            existing.dtype = dtype;
            existing.entity_type = entity_type.to_string();
            existing.ttl_hours = ttl_hours;
            existing.description = description.to_string();
            existing.tags = tags;
            existing.updated_at = now;
            return Ok((existing.feature_id, existing.created_at));
        }

        let mut next_id = self.next_id.lock().unwrap();
        let feature_id = FeatureId(*next_id);
        *next_id += 1;
        schemas.push(FeatureSchema {
            feature_id,
            name: name.to_string(),
            version,
            dtype,
            entity_type: entity_type.to_string(),
            ttl_hours,
            description: description.to_string(),
            tags,
            created_at: now,
            updated_at: now,
        });
        Ok((feature_id, now))
    }

    async fn get_feature(
        &self,
        name: &str,
        version: Option<u32>,
    ) -> Result<Option<FeatureSchema>, RegistryError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        let schemas = self.schemas.lock().unwrap();
        let found = match version {
            Some(v) => schemas.iter().find(|s| s.name == name && s.version == v).cloned(),
            None => schemas
                .iter()
                .filter(|s| s.name == name)
                .max_by_key(|s| s.version)
                .cloned(),
        };
        Ok(found)
    }

    async fn list_features(
        &self,
        entity_type: Option<&str>,
    ) -> Result<Vec<FeatureSchema>, RegistryError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        let schemas = self.schemas.lock().unwrap();
        let mut out: Vec<_> = schemas
            .iter()
            .filter(|s| entity_type.map_or(true, |t| s.entity_type == t))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.version.cmp(&b.version)));
        Ok(out)
    }

    async fn get_feature_by_id(&self, id: FeatureId) -> Result<Option<FeatureSchema>, RegistryError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(self
            .schemas
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.feature_id == id)
            .cloned())
    }

    async fn ping(&self) -> Result<(), RegistryError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(())
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    use super::*;

    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &Result<T, FeatureStoreError>) {
        match result {
            Err(FeatureStoreError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[track_caller]
    pub fn assert_store_unavailable<T: std::fmt::Debug>(result: &Result<T, FeatureStoreError>) {
        match result {
            Err(FeatureStoreError::StoreUnavailable(_)) => {}
            other => panic!("expected StoreUnavailable, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn mock_cache_round_trips_entries() {
        let cache = MockCache::new();
        let feature = fixtures::fresh_cached_feature(FeatureValueData::Int64(5));
        cache.set_many(&[("u1:age".to_string(), feature.clone())], 60).await.unwrap();
        let got = cache.get_many(&["u1:age".to_string()]).await.unwrap();
        assert_eq!(got, vec![Some(feature)]);
    }

    #[tokio::test]
    async fn mock_cache_invalidate_removes_matching_prefix() {
        let cache = MockCache::new();
        let feature = fixtures::fresh_cached_feature(FeatureValueData::Bool(true));
        cache.set_many(&[("u1:flag".to_string(), feature)], 60).await.unwrap();
        let removed = cache.invalidate("u1:*").await.unwrap();
        assert_eq!(removed, 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn mock_store_point_in_time_lookup_ignores_future_rows() {
        let store = MockStore::new();
        store.map_name("user_age", FeatureId(1));
        let mut early = fixtures::user_age_value("u1", 30);
        early.timestamp = chrono::DateTime::from_timestamp(1_000, 0).unwrap();
        let mut late = early.clone();
        late.value = FeatureValueData::Int64(31);
        late.timestamp = chrono::DateTime::from_timestamp(2_000, 0).unwrap();
        store.seed(early.clone());
        store.seed(late);

        let as_of = chrono::DateTime::from_timestamp(1_500, 0).unwrap();
        let result = store
            .get_features(&[EntityId::from("u1")], &["user_age".to_string()], as_of)
            .await
            .unwrap();

        let row = &result[&EntityId::from("u1")]["user_age"];
        assert_eq!(row.value, FeatureValueData::Int64(30));
    }

    #[tokio::test]
    async fn mock_registry_register_is_idempotent_on_name_and_version() {
        let registry = MockRegistry::new();
        let (id1, _) = registry
            .register("user_age", 1, DType::Int64, "user", 24, "", None)
            .await
            .unwrap();
        let (id2, _) = registry
            .register("user_age", 1, DType::Int64, "user", 48, "updated", None)
            .await
            .unwrap();
        assert_eq!(id1, id2);
        let schema = registry.get_feature("user_age", None).await.unwrap().unwrap();
        assert_eq!(schema.ttl_hours, 48);
    }

    proptest! {
        #[test]
        fn prop_feature_value_matches_its_generated_dtype(dtype in generators::arb_dtype()) {
            let strategy = generators::arb_value_for_dtype(dtype);
            let mut runner = proptest::test_runner::TestRunner::default();
            let value = strategy.new_tree(&mut runner).unwrap().current();
            prop_assert!(value.matches(dtype));
        }

        #[test]
        fn prop_generated_schema_has_positive_version(schema in generators::arb_feature_schema()) {
            prop_assert!(schema.version >= 1);
        }
    }
}
