use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, HistogramVec, IntCounter, IntCounterVec,
    Registry, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Request metrics
    pub static ref REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        "tsdb_client_requests_total",
        "Total number of requests sent to the TSDB backend",
        &["endpoint"],
        REGISTRY
    ).expect("tsdb_client_requests_total is registered once");

    pub static ref REQUEST_FAILURES: IntCounterVec = register_int_counter_vec_with_registry!(
        "tsdb_client_request_failures_total",
        "Total number of failed TSDB requests by error kind",
        &["endpoint", "kind"],
        REGISTRY
    ).expect("tsdb_client_request_failures_total is registered once");

    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        "tsdb_client_request_duration_seconds",
        "TSDB request duration in seconds, including response parsing",
        &["endpoint"],
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0],
        REGISTRY
    ).expect("tsdb_client_request_duration_seconds is registered once");

    pub static ref SERIES_RETURNED: IntCounter = register_int_counter_with_registry!(
        "tsdb_client_series_returned_total",
        "Total number of series returned by successful queries",
        REGISTRY
    ).expect("tsdb_client_series_returned_total is registered once");
}

/// Counts a request on creation and records its latency when dropped.
pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn new(endpoint: &'static str) -> Self {
        REQUESTS_TOTAL.with_label_values(&[endpoint]).inc();
        Self {
            endpoint,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        REQUEST_DURATION
            .with_label_values(&[self.endpoint])
            .observe(duration);
    }
}

pub fn record_failure(endpoint: &str, kind: &str) {
    REQUEST_FAILURES.with_label_values(&[endpoint, kind]).inc();
}

pub fn record_series(count: usize) {
    SERIES_RETURNED.inc_by(count as u64);
}

/// Render the client registry in the text exposition format.
pub fn gather() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&REGISTRY.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
