// Prometheus metrics registry and collectors

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Registry for the client's own collectors
    pub static ref REGISTRY: Registry = Registry::new();

    /// Physical attempts, by outcome label (see `outcome_label`)
    pub static ref ATTEMPTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("client_attempts_total", "Total HTTP attempts made by the client"),
        &["method", "outcome"],
        REGISTRY
    ).unwrap();

    /// Backoff sleeps taken before a retry
    pub static ref RETRIES_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("client_retries_total", "Total retries after transient failures"),
        &["method"],
        REGISTRY
    ).unwrap();

    /// Wall time of a logical request, retries and backoff included
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new(
            "client_request_duration_seconds",
            "Logical request duration in seconds"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["method", "outcome"],
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
