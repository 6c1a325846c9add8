//! Error taxonomy for feature store operations.
//!
//! Errors are grouped by the subsystem that raises them and unified into
//! [`FeatureStoreError`]. A cache-tier failure (including a corrupt cache
//! entry, handled inline by the codec) never surfaces past the cache tier's
//! own boundary — the serving engine downgrades it to a miss at the call
//! site rather than by convention.

use thiserror::Error;

/// A request failed validation before any I/O was attempted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("feature_names must not be empty")]
    EmptyFeatureNames,

    #[error("batch size {requested} exceeds the configured maximum of {max}")]
    BatchTooLarge { requested: usize, max: usize },

    #[error("unknown feature dtype '{0}'")]
    UnknownDType(String),

    #[error("ttl_hours must be at least 1, got {0}")]
    NonPositiveTtl(u32),

    #[error("feature version must be at least 1, got {0}")]
    NonPositiveVersion(u32),

    #[error("feature name must be 1-255 characters, got {0}")]
    NameLengthOutOfRange(usize),
}

/// The durable store (Postgres) could not service a request.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("connection pool exhausted")]
    PoolExhausted,

    #[error("query timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("query failed: {0}")]
    Query(String),

    #[error("write failed, transaction rolled back: {0}")]
    WriteFailed(String),
}

/// The cache tier (Redis) could not service a request.
///
/// Every `CacheBackend` method returns a `Result<_, CacheError>` so the
/// serving engine decides, per call site, whether an error is a soft miss
/// (reads, writes) or must propagate (explicit invalidation).
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache connection unavailable: {0}")]
    Unavailable(String),

    #[error("cache command failed: {0}")]
    Command(String),
}

/// The feature registry's backing store could not service a request.
///
/// A feature that is simply unregistered is not represented here — callers
/// express that as [`FeatureStoreError::NotFound`] directly, since it is not
/// a registry *failure*.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("registry store unavailable: {0}")]
    Unavailable(String),

    #[error("registry write failed: {0}")]
    WriteFailed(String),
}

/// Top-level error type returned by the serving engine, write path, and
/// registry to their HTTP callers.
#[derive(Debug, Clone, Error)]
pub enum FeatureStoreError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("authentication failed")]
    Auth,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("durable store unavailable")]
    StoreUnavailable(#[from] StoreError),

    #[error("feature registry unavailable")]
    RegistryUnavailable(#[from] RegistryError),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("internal error: {0}")]
    Unexpected(String),
}

/// Result alias for feature store operations.
pub type FeatureStoreResult<T> = Result<T, FeatureStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts_into_top_level_error() {
        let err: FeatureStoreError = StoreError::PoolExhausted.into();
        assert!(matches!(err, FeatureStoreError::StoreUnavailable(_)));
    }

    #[test]
    fn registry_error_converts_into_top_level_error() {
        let err: FeatureStoreError = RegistryError::Unavailable("pool exhausted".into()).into();
        assert!(matches!(err, FeatureStoreError::RegistryUnavailable(_)));
    }

    #[test]
    fn validation_error_messages_are_descriptive() {
        let err = ValidationError::BatchTooLarge {
            requested: 5000,
            max: 1000,
        };
        assert!(err.to_string().contains("5000"));
        assert!(err.to_string().contains("1000"));
    }
}
