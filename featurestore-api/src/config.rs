//! Server-wide configuration, loaded from `key=value` environment
//! variables.

use std::time::Duration;

/// Listening address, batch-size ceiling, and per-request deadline.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Defensive ceiling re-checked inside the core regardless of upstream
    /// validation.
    pub max_batch_size: usize,
    /// End-to-end deadline applied to a request when the caller does not
    /// supply one.
    pub default_request_deadline: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_batch_size: 1000,
            default_request_deadline: Duration::from_secs(5),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("FEATURESTORE_API_HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .or_else(|| std::env::var("FEATURESTORE_API_PORT").ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            max_batch_size: std::env::var("FEATURESTORE_BATCH_MAX_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_batch_size),
            default_request_deadline: std::env::var("FEATURESTORE_REQUEST_DEADLINE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_request_deadline),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
