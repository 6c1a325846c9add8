//! Storage tier for the feature store: the cache, the durable store, and
//! the feature registry.
//!
//! This crate contains no HTTP surface and no serving logic — it exposes
//! the three storage traits plus their Postgres/Redis implementations.
//! `featurestore-api` composes them into the serving engine and write path.

pub mod cache;
pub mod registry;
pub mod store;

pub use cache::{CacheBackend, CacheConfig, RedisCache};
pub use registry::{PostgresRegistry, Registry};
pub use store::{DurableStore, PostgresStore, StoreConfig};
