use async_trait::async_trait;
use deadpool_postgres::Pool;
use featurestore_core::{DType, FeatureId, FeatureSchema, RegistryError, Timestamp};
use std::str::FromStr;
use std::time::Duration;

use super::traits::Registry;

/// PostgreSQL-backed implementation of [`Registry`], on its own connection
/// pool — registry writes are rare, so a smaller pool suffices.
pub struct PostgresRegistry {
    pool: Pool,
    command_timeout: Duration,
}

impl PostgresRegistry {
    pub fn new(pool: Pool, command_timeout: Duration) -> Self {
        Self {
            pool,
            command_timeout,
        }
    }

    async fn get_client(&self) -> Result<deadpool_postgres::Object, RegistryError> {
        self.pool
            .get()
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))
    }

    async fn with_timeout<F, T>(&self, fut: F) -> Result<T, RegistryError>
    where
        F: std::future::Future<Output = Result<T, tokio_postgres::Error>>,
    {
        tokio::time::timeout(self.command_timeout, fut)
            .await
            .map_err(|_| RegistryError::Unavailable("registry query timed out".to_string()))?
            .map_err(|e| RegistryError::Unavailable(e.to_string()))
    }
}

fn row_to_schema(row: &tokio_postgres::Row) -> Result<FeatureSchema, RegistryError> {
    let dtype_str: String = row.get("dtype");
    let dtype = DType::from_str(&dtype_str)
        .map_err(|e| RegistryError::Unavailable(format!("corrupt dtype in registry row: {e}")))?;
    Ok(FeatureSchema {
        feature_id: FeatureId(row.get::<_, i64>("id")),
        name: row.get("name"),
        version: row.get::<_, i32>("version") as u32,
        dtype,
        entity_type: row.get("entity_type"),
        ttl_hours: row.get::<_, i32>("ttl_hours") as u32,
        description: row.get("description"),
        tags: row.get::<_, Option<Vec<String>>>("tags"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl Registry for PostgresRegistry {
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
        let client = self.get_client().await?;
        const UPSERT: &str = "
            INSERT INTO features (name, version, dtype, entity_type, ttl_hours, description, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
            ON CONFLICT (name, version) DO UPDATE SET
                dtype = EXCLUDED.dtype,
                entity_type = EXCLUDED.entity_type,
                ttl_hours = EXCLUDED.ttl_hours,
                description = EXCLUDED.description,
                tags = EXCLUDED.tags,
                updated_at = now()
            RETURNING id, created_at
        ";
        let row = self
            .with_timeout(client.query_one(
                UPSERT,
                &[
                    &name,
                    &(version as i32),
                    &dtype.to_string(),
                    &entity_type,
                    &(ttl_hours as i32),
                    &description,
                    &tags,
                ],
            ))
            .await
            .map_err(|e| match e {
                RegistryError::Unavailable(msg) => RegistryError::WriteFailed(msg),
                other => other,
            })?;

        Ok((FeatureId(row.get("id")), row.get("created_at")))
    }

    async fn get_feature(
        &self,
        name: &str,
        version: Option<u32>,
    ) -> Result<Option<FeatureSchema>, RegistryError> {
        let client = self.get_client().await?;
        let row = match version {
            Some(v) => {
                self.with_timeout(client.query_opt(
                    "SELECT * FROM features WHERE name = $1 AND version = $2",
                    &[&name, &(v as i32)],
                ))
                .await?
            }
            None => {
                self.with_timeout(client.query_opt(
                    "SELECT * FROM features WHERE name = $1 ORDER BY version DESC LIMIT 1",
                    &[&name],
                ))
                .await?
            }
        };
        row.as_ref().map(row_to_schema).transpose()
    }

    async fn list_features(
        &self,
        entity_type: Option<&str>,
    ) -> Result<Vec<FeatureSchema>, RegistryError> {
        let client = self.get_client().await?;
        let rows = match entity_type {
            Some(et) => {
                self.with_timeout(client.query(
                    "SELECT * FROM features WHERE entity_type = $1 ORDER BY name ASC, version ASC",
                    &[&et],
                ))
                .await?
            }
            None => {
                self.with_timeout(
                    client.query("SELECT * FROM features ORDER BY name ASC, version ASC", &[]),
                )
                .await?
            }
        };
        rows.iter().map(row_to_schema).collect()
    }

    async fn get_feature_by_id(&self, id: FeatureId) -> Result<Option<FeatureSchema>, RegistryError> {
        let client = self.get_client().await?;
        let row = self
            .with_timeout(client.query_opt("SELECT * FROM features WHERE id = $1", &[&id.0]))
            .await?;
        row.as_ref().map(row_to_schema).transpose()
    }

    async fn ping(&self) -> Result<(), RegistryError> {
        let client = self.get_client().await?;
        self.with_timeout(client.query_one("SELECT 1", &[])).await?;
        Ok(())
    }
}
