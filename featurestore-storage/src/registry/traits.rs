use async_trait::async_trait;
use featurestore_core::{DType, FeatureId, FeatureSchema, RegistryError, Timestamp};

/// Feature schema catalog: name, version, type, TTL, entity type.
///
/// The registry is authoritative — the serving path trusts feature-name to
/// schema lookups from here. Registry writes are rare compared to value
/// writes, so this lives on a separate (typically smaller) pool from the
/// durable store.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Upsert keyed by `(name, version)`; on conflict, updates every
    /// mutable field and bumps `updated_at`. Returns the row's stable id
    /// and the timestamp it was first created at.
    #[allow(clippy::too_many_arguments)]
    async fn register(
        &self,
        name: &str,
        version: u32,
        dtype: DType,
        entity_type: &str,
        ttl_hours: u32,
        description: &str,
        tags: Option<Vec<String>>,
    ) -> Result<(FeatureId, Timestamp), RegistryError>;

    /// Look up a schema by name. Without `version`, returns the row with
    /// the greatest version for that name.
    async fn get_feature(
        &self,
        name: &str,
        version: Option<u32>,
    ) -> Result<Option<FeatureSchema>, RegistryError>;

    /// List every registered schema, ordered by `(name, version ascending)`,
    /// optionally filtered to one entity type.
    async fn list_features(
        &self,
        entity_type: Option<&str>,
    ) -> Result<Vec<FeatureSchema>, RegistryError>;

    /// Look up a schema by its stable id.
    async fn get_feature_by_id(&self, id: FeatureId) -> Result<Option<FeatureSchema>, RegistryError>;

    /// Liveness probe used by `/ready`.
    async fn ping(&self) -> Result<(), RegistryError>;
}
