use std::time::Duration;

/// Connection configuration for a Postgres-backed pool (durable store or
/// registry — the two pools share this shape; a registry pool is typically
/// sized much smaller since registry writes are rare).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub min_pool_size: usize,
    pub max_pool_size: usize,
    /// Per-query command timeout. Pool exhaustion or an exceeded timeout
    /// surfaces as `StoreError::Timeout` / `StoreError::PoolExhausted`,
    /// never a hang.
    pub command_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "featurestore".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            min_pool_size: 2,
            max_pool_size: 16,
            command_timeout: Duration::from_secs(3),
        }
    }
}

impl StoreConfig {
    /// Load durable-store connection settings from `FEATURESTORE_DB_*`
    /// environment variables.
    pub fn from_env() -> Self {
        Self::from_env_prefix("FEATURESTORE_DB")
    }

    /// Load registry pool settings from `FEATURESTORE_REGISTRY_DB_*`,
    /// falling back to the durable-store settings for anything unset so a
    /// single-database deployment needs no extra configuration.
    pub fn from_env_registry() -> Self {
        let fallback = Self::from_env();
        let prefix = "FEATURESTORE_REGISTRY_DB";
        Self {
            host: std::env::var(format!("{prefix}_HOST")).unwrap_or(fallback.host),
            port: std::env::var(format!("{prefix}_PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(fallback.port),
            dbname: std::env::var(format!("{prefix}_NAME")).unwrap_or(fallback.dbname),
            user: std::env::var(format!("{prefix}_USER")).unwrap_or(fallback.user),
            password: std::env::var(format!("{prefix}_PASSWORD")).unwrap_or(fallback.password),
            min_pool_size: std::env::var(format!("{prefix}_POOL_MIN"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            max_pool_size: std::env::var(format!("{prefix}_POOL_MAX"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            command_timeout: fallback.command_timeout,
        }
    }

    fn from_env_prefix(prefix: &str) -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var(format!("{prefix}_HOST")).unwrap_or(defaults.host),
            port: std::env::var(format!("{prefix}_PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            dbname: std::env::var(format!("{prefix}_NAME")).unwrap_or(defaults.dbname),
            user: std::env::var(format!("{prefix}_USER")).unwrap_or(defaults.user),
            password: std::env::var(format!("{prefix}_PASSWORD")).unwrap_or(defaults.password),
            min_pool_size: std::env::var(format!("{prefix}_POOL_MIN"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_pool_size),
            max_pool_size: std::env::var(format!("{prefix}_POOL_MAX"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_pool_size),
            command_timeout: std::env::var(format!("{prefix}_TIMEOUT_SECS"))
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.command_timeout),
        }
    }

    /// Build a bounded `deadpool_postgres::Pool` from this configuration.
    pub fn create_pool(&self) -> Result<deadpool_postgres::Pool, featurestore_core::StoreError> {
        let mut cfg = deadpool_postgres::Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(self.max_pool_size));

        cfg.create_pool(Some(deadpool_postgres::Runtime::Tokio1), tokio_postgres::NoTls)
            .map_err(|e| featurestore_core::StoreError::Query(format!("failed to build pool: {e}")))
    }

    /// Eagerly open `min_pool_size` connections against an already-built
    /// pool. `deadpool_postgres` otherwise only opens connections lazily as
    /// callers request them, so without this a cold-started process pays
    /// the connection-setup cost on its first `min_pool_size` requests
    /// instead of at startup.
    pub async fn warm_pool(
        &self,
        pool: &deadpool_postgres::Pool,
    ) -> Result<(), featurestore_core::StoreError> {
        let mut warmed = Vec::with_capacity(self.min_pool_size);
        for _ in 0..self.min_pool_size {
            let conn = pool.get().await.map_err(|e| {
                featurestore_core::StoreError::Query(format!("pool warm-up failed: {e}"))
            })?;
            warmed.push(conn);
        }
        drop(warmed);
        Ok(())
    }
}
