//! Process entry point: load configuration, build connection pools and
//! storage backends, assemble the router, serve, and drain on shutdown.

use std::sync::Arc;
use std::time::Instant;

use featurestore_storage::{CacheConfig, PostgresRegistry, PostgresStore, RedisCache, StoreConfig};

use featurestore_api::auth::AuthConfig;
use featurestore_api::config::ApiConfig;
use featurestore_api::serving::ServingEngine;
use featurestore_api::state::AppState;
use featurestore_api::write_path::WritePath;
use featurestore_api::{build_router, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let api_config = Arc::new(ApiConfig::from_env());
    let auth_config = Arc::new(AuthConfig::from_env());

    let cache_config = CacheConfig::from_env();
    let store_config = StoreConfig::from_env();
    let registry_config = StoreConfig::from_env_registry();

    let store_pool = store_config.create_pool()?;
    let registry_pool = registry_config.create_pool()?;
    store_config.warm_pool(&store_pool).await?;
    registry_config.warm_pool(&registry_pool).await?;

    let cache = Arc::new(RedisCache::connect(cache_config.clone()).await?);
    let store = Arc::new(PostgresStore::new(store_pool, store_config.command_timeout));
    let registry = Arc::new(PostgresRegistry::new(
        registry_pool,
        registry_config.command_timeout,
    ));

    let serving = Arc::new(ServingEngine::new(
        cache.clone(),
        store.clone(),
        cache_config.default_ttl_seconds,
    ));
    let write_path = Arc::new(WritePath::new(store.clone()));

    let state = AppState {
        serving,
        write_path,
        registry,
        auth: auth_config,
        config: api_config.clone(),
        start_time: Instant::now(),
    };

    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(api_config.bind_addr()).await?;
    tracing::info!(addr = %api_config.bind_addr(), "feature store listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain in reverse-dependency order: cache first, then the durable
    // store and registry pools the cache backfill writes through to.
    drop(cache);
    drop(store);
    drop(registry);

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl_c handler, shutting down immediately");
        return;
    }
    tracing::info!("shutdown signal received, draining in-flight requests");
}
