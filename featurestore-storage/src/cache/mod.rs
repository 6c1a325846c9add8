//! Cache tier: a low-latency key/value store with TTL and pattern
//! deletion, backed by Redis.
//!
//! A present cache entry is a hint, never authoritative — on mismatch with
//! the durable store, the durable store wins. A missing entry is not
//! evidence of absence. All cache errors observed by a caller are soft
//! except `invalidate`, whose error the caller explicitly asked for.

pub mod codec;
pub mod config;
pub mod redis_backend;
pub mod traits;

pub use codec::{decode, encode, CodecError};
pub use config::CacheConfig;
pub use redis_backend::RedisCache;
pub use traits::{cache_key, invalidate_pattern, CacheBackend};
