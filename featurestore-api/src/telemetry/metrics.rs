//! Prometheus metrics for request volume, latency, and cache effectiveness,
//! namespaced with a `featurestore_` prefix, registered as process-wide
//! lazy statics and scraped via `/metrics`.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

const DB_LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5];

pub struct ServingMetrics {
    /// Online-read outcomes, labeled by `source` (`cache`/`database`/`mixed`).
    pub feature_reads_total: CounterVec,
    /// Durable-store query duration, labeled by `operation`
    /// (`get_features`/`write_features`/`get_feature_history`).
    pub db_query_duration_seconds: HistogramVec,
    /// Cache invalidations, labeled by `result` (`ok`/`error`).
    pub invalidations_total: CounterVec,
}

impl ServingMetrics {
    fn new() -> Self {
        Self {
            feature_reads_total: register_counter_vec!(
                "featurestore_feature_reads_total",
                "Online feature reads, labeled by source",
                &["source"]
            )
            .expect("metric registration should not collide"),
            db_query_duration_seconds: register_histogram_vec!(
                "featurestore_db_query_duration_seconds",
                "Durable store query duration in seconds",
                &["operation"],
                DB_LATENCY_BUCKETS.to_vec()
            )
            .expect("metric registration should not collide"),
            invalidations_total: register_counter_vec!(
                "featurestore_cache_invalidations_total",
                "Cache invalidation calls, labeled by result",
                &["result"]
            )
            .expect("metric registration should not collide"),
        }
    }
}

pub static METRICS: Lazy<ServingMetrics> = Lazy::new(ServingMetrics::new);

/// `GET /metrics` — Prometheus scrape target.
pub async fn metrics_handler() -> impl IntoResponse {
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(%err, "failed to encode prometheus metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new());
    }
    (
        StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
