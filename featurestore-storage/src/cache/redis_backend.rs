use async_trait::async_trait;
use featurestore_core::{CacheError, CachedFeature};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::Mutex;

use super::codec;
use super::config::CacheConfig;
use super::traits::CacheBackend;

/// Redis-backed implementation of [`CacheBackend`].
///
/// Uses a single [`ConnectionManager`], which transparently reconnects and
/// is safe to clone/share across tasks — pipelined commands over one
/// managed connection rather than a pool of raw connections.
pub struct RedisCache {
    conn: Mutex<ConnectionManager>,
    config: CacheConfig,
}

impl RedisCache {
    /// Connect to Redis using the given configuration.
    pub async fn connect(config: CacheConfig) -> Result<Self, CacheError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            config,
        })
    }

    /// Bound a single Redis round trip to `config.command_timeout` so a
    /// hung or degraded connection fails fast into the caller's miss
    /// fallback instead of blocking on the OS socket default.
    async fn with_timeout<F, T>(&self, fut: F) -> Result<T, CacheError>
    where
        F: std::future::Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.config.command_timeout, fut)
            .await
            .map_err(|_| CacheError::Unavailable("cache command timed out".to_string()))?
            .map_err(|e| CacheError::Command(e.to_string()))
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<CachedFeature>>, CacheError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.lock().await;
        let raw: Vec<Option<Vec<u8>>> = self
            .with_timeout(redis::cmd("MGET").arg(keys).query_async(&mut *conn))
            .await?;

        Ok(raw
            .into_iter()
            .map(|maybe_bytes| {
                maybe_bytes.and_then(|bytes| match codec::decode(&bytes) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        tracing::warn!(error = %err, "discarding corrupt cache entry, treating as miss");
                        None
                    }
                })
            })
            .collect())
    }

    async fn set_many(
        &self,
        entries: &[(String, CachedFeature)],
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        for (key, record) in entries {
            let bytes = codec::encode(record);
            pipe.cmd("SETEX").arg(key).arg(ttl_seconds).arg(bytes).ignore();
        }
        let mut conn = self.conn.lock().await;
        self.with_timeout(pipe.query_async::<_, ()>(&mut *conn)).await?;
        Ok(())
    }

    async fn invalidate(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.lock().await;
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = self
                .with_timeout(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(self.config.scan_chunk_size)
                        .query_async(&mut *conn),
                )
                .await?;

            if !keys.is_empty() {
                let removed: u64 = self.with_timeout(conn.del(&keys)).await?;
                deleted += removed;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        Ok(deleted)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.lock().await;
        let _: String = self
            .with_timeout(redis::cmd("PING").query_async(&mut *conn))
            .await?;
        Ok(())
    }
}
