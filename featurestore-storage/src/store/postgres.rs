use async_trait::async_trait;
use deadpool_postgres::Pool;
use featurestore_core::{
    EntityId, FeatureId, FeatureValueData, StoreError, StoredFeatureValue, Timestamp,
};
use std::collections::HashMap;
use std::time::Duration;

use super::traits::DurableStore;

/// PostgreSQL-backed implementation of [`DurableStore`].
///
/// Time-series partitioning of `feature_values` (e.g. a TimescaleDB
/// hypertable keyed on `timestamp`) is a schema/deployment concern handled
/// by migration tooling, not by this client — see DESIGN.md.
pub struct PostgresStore {
    pool: Pool,
    command_timeout: Duration,
}

impl PostgresStore {
    pub fn new(pool: Pool, command_timeout: Duration) -> Self {
        Self {
            pool,
            command_timeout,
        }
    }

    async fn get_client(
        &self,
    ) -> Result<deadpool_postgres::Object, StoreError> {
        self.pool.get().await.map_err(|e| match e {
            deadpool_postgres::PoolError::Timeout(_) => StoreError::PoolExhausted,
            other => StoreError::Query(other.to_string()),
        })
    }

    async fn with_timeout<F, T>(&self, fut: F) -> Result<T, StoreError>
    where
        F: std::future::Future<Output = Result<T, tokio_postgres::Error>>,
    {
        tokio::time::timeout(self.command_timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout(self.command_timeout))?
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

fn row_to_stored_value(row: &tokio_postgres::Row) -> Result<StoredFeatureValue, StoreError> {
    let value_json: serde_json::Value = row.get("value");
    let metadata_json: serde_json::Value = row.get("metadata");
    let value: FeatureValueData = serde_json::from_value(value_json)
        .map_err(|e| StoreError::Query(format!("malformed stored value: {e}")))?;
    let metadata = metadata_json
        .as_object()
        .cloned()
        .unwrap_or_default();

    Ok(StoredFeatureValue {
        feature_id: FeatureId(row.get::<_, i64>("feature_id")),
        entity_id: EntityId(row.get::<_, String>("entity_id")),
        timestamp: row.get("timestamp"),
        value,
        metadata,
    })
}

#[async_trait]
impl DurableStore for PostgresStore {
    async fn get_features(
        &self,
        entity_ids: &[EntityId],
        feature_names: &[String],
        as_of: Timestamp,
    ) -> Result<HashMap<EntityId, HashMap<String, StoredFeatureValue>>, StoreError> {
        if entity_ids.is_empty() || feature_names.is_empty() {
            return Ok(HashMap::new());
        }
        let client = self.get_client().await?;
        let entity_strs: Vec<&str> = entity_ids.iter().map(|e| e.0.as_str()).collect();

        const QUERY: &str = "
            SELECT DISTINCT ON (fv.entity_id, f.name)
                f.id AS feature_id, fv.entity_id, f.name AS feature_name,
                fv.timestamp, fv.value, fv.metadata
            FROM feature_values fv
            JOIN features f ON f.id = fv.feature_id
            WHERE fv.entity_id = ANY($1) AND f.name = ANY($2) AND fv.timestamp <= $3
            ORDER BY fv.entity_id, f.name, fv.timestamp DESC, f.id DESC
        ";

        let rows = self
            .with_timeout(client.query(QUERY, &[&entity_strs, &feature_names, &as_of]))
            .await?;

        let mut result: HashMap<EntityId, HashMap<String, StoredFeatureValue>> = HashMap::new();
        for row in &rows {
            let feature_name: String = row.get("feature_name");
            let stored = row_to_stored_value(row)?;
            result
                .entry(stored.entity_id.clone())
                .or_default()
                .insert(feature_name, stored);
        }
        Ok(result)
    }

    async fn write_features(&self, batch: &[StoredFeatureValue]) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut client = self.get_client().await?;
        let txn = self
            .with_timeout(async { client.transaction().await })
            .await?;

        const UPSERT: &str = "
            INSERT INTO feature_values (feature_id, entity_id, timestamp, value, metadata)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (feature_id, entity_id, timestamp)
            DO UPDATE SET value = EXCLUDED.value, metadata = EXCLUDED.metadata
        ";
        let stmt = self
            .with_timeout(async { txn.prepare(UPSERT).await })
            .await?;

        for row in batch {
            let value_json = serde_json::to_value(&row.value)
                .map_err(|e| StoreError::WriteFailed(format!("value serialization: {e}")))?;
            let metadata_json = serde_json::Value::Object(row.metadata.clone());
            self.with_timeout(async {
                txn.execute(
                    &stmt,
                    &[
                        &row.feature_id.0,
                        &row.entity_id.0,
                        &row.timestamp,
                        &value_json,
                        &metadata_json,
                    ],
                )
                .await
            })
            .await
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        }

        self.with_timeout(async { txn.commit().await })
            .await
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    async fn get_feature_history(
        &self,
        entity_id: &EntityId,
        feature_name: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<StoredFeatureValue>, StoreError> {
        let client = self.get_client().await?;
        const QUERY: &str = "
            SELECT f.id AS feature_id, fv.entity_id, fv.timestamp, fv.value, fv.metadata
            FROM feature_values fv
            JOIN features f ON f.id = fv.feature_id
            WHERE fv.entity_id = $1 AND f.name = $2
              AND fv.timestamp >= $3 AND fv.timestamp <= $4
            ORDER BY fv.timestamp ASC
        ";
        let rows = self
            .with_timeout(client.query(QUERY, &[&entity_id.0, &feature_name, &start, &end]))
            .await?;
        rows.iter().map(row_to_stored_value).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.get_client().await?;
        self.with_timeout(client.query_one("SELECT 1", &[]))
            .await?;
        Ok(())
    }
}
