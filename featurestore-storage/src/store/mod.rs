//! Durable store: a persistent, time-series feature table with
//! point-in-time query support, backed by PostgreSQL.

pub mod config;
pub mod postgres;
pub mod traits;

pub use config::StoreConfig;
pub use postgres::PostgresStore;
pub use traits::DurableStore;
