use std::time::Duration;

/// Configuration for the Redis-backed cache tier.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis connection URL, e.g. `redis://127.0.0.1:6379`.
    pub url: String,
    /// Default TTL applied to entries written by the serving engine's
    /// miss-repair backfill.
    pub default_ttl_seconds: u64,
    /// Socket-level connect/command timeout. Cache operations fail fast into
    /// the "miss" fallback path rather than blocking the request.
    pub command_timeout: Duration,
    /// Chunk size used when enumerating keys for `invalidate`'s `SCAN` walk.
    pub scan_chunk_size: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            default_ttl_seconds: 3600,
            command_timeout: Duration::from_millis(250),
            scan_chunk_size: 200,
        }
    }
}

impl CacheConfig {
    /// Build configuration from environment variables, falling back to
    /// sensible defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("FEATURESTORE_CACHE_URL").unwrap_or(defaults.url),
            default_ttl_seconds: std::env::var("FEATURESTORE_CACHE_DEFAULT_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_ttl_seconds),
            command_timeout: std::env::var("FEATURESTORE_CACHE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.command_timeout),
            scan_chunk_size: std::env::var("FEATURESTORE_CACHE_SCAN_CHUNK")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.scan_chunk_size),
        }
    }
}
