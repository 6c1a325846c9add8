//! Shared application state injected into every Axum handler.
//!
//! The cache, store, and registry connection pools are constructed once at
//! startup as explicit resources owned by the top-level server value, and
//! handed to the serving engine / write path / registry here, rather than
//! reaching for process-wide globals.

use std::sync::Arc;
use std::time::Instant;

use featurestore_storage::Registry;

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::serving::ServingEngine;
use crate::write_path::WritePath;

#[derive(Clone)]
pub struct AppState {
    pub serving: Arc<ServingEngine>,
    pub write_path: Arc<WritePath>,
    pub registry: Arc<dyn Registry>,
    pub auth: Arc<AuthConfig>,
    pub config: Arc<ApiConfig>,
    pub start_time: Instant,
}
