use async_trait::async_trait;
use featurestore_core::CachedFeature;
use featurestore_core::CacheError;

/// The cache tier: a low-latency key/value store with TTL and
/// glob-style pattern deletion.
///
/// Every method returns a `Result` so soft/hard error handling stays an
/// explicit decision at the call site (the serving engine) rather than an
/// implicit swallow inside the backend. `get_many` and `set_many` are
/// best-effort from the *caller's* point of view — the engine downgrades
/// their errors to "all absent" / "dropped" — but the backend itself never
/// hides a failure.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Batched, order-preserving lookup. A pipelined round trip: one network
    /// exchange regardless of `keys.len()`. Each position resolves to
    /// `Some(record)` on a decodable hit, `None` on a miss or a corrupt
    /// entry — the caller cannot distinguish "absent" from "undecodable"
    /// and must not need to, per spec.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<CachedFeature>>, CacheError>;

    /// Batched, pipelined write with one TTL applied to every entry.
    /// Individual per-key failures inside a Redis pipeline surface as a
    /// single `CacheError` for the whole call; the caller (serving engine)
    /// treats any error here as best-effort and logs-and-drops.
    async fn set_many(
        &self,
        entries: &[(String, CachedFeature)],
        ttl_seconds: u64,
    ) -> Result<(), CacheError>;

    /// Delete every key matching a glob-style pattern (e.g. `"u42:*"`).
    /// Enumerated in bounded chunks so one invalidation never blocks the
    /// tier for an extended scan. The returned count is advisory: concurrent
    /// writers may add or remove matching keys mid-scan.
    async fn invalidate(&self, pattern: &str) -> Result<u64, CacheError>;

    /// Liveness probe used by `/ready`.
    async fn ping(&self) -> Result<(), CacheError>;
}

/// Build the cache key for an `(entity_id, feature_name)` pair:
/// `"{entity_id}:{feature_name}"`.
pub fn cache_key(entity_id: &str, feature_name: &str) -> String {
    format!("{entity_id}:{feature_name}")
}

/// Build the glob pattern used to invalidate every cached feature for an
/// entity: `"{entity_id}:*"`.
pub fn invalidate_pattern(entity_id: &str) -> String {
    format!("{entity_id}:*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_matches_spec_format() {
        assert_eq!(cache_key("u42", "user_age"), "u42:user_age");
    }

    #[test]
    fn invalidate_pattern_matches_spec_format() {
        assert_eq!(invalidate_pattern("u42"), "u42:*");
    }
}
