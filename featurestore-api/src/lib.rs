//! Serving engine, write path, and HTTP surface for the feature store.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod serving;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod validation;
pub mod write_path;

pub use routes::build_router;
pub use state::AppState;
