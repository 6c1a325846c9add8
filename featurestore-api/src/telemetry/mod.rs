pub mod metrics;
pub mod tracer;

pub use metrics::{metrics_handler, ServingMetrics, METRICS};
pub use tracer::init_tracing;
