//! Metrics collection and exposition.
//!
//! # Metrics
//! - `jobzan_http_requests_total` (counter): requests by method, route, status
//! - `jobzan_http_request_duration_seconds` (histogram): latency distribution
//! - `jobzan_client_retries_total` (counter): client retries by reason
//! - `jobzan_client_failures_total` (counter): terminal client failures by kind
//! - `jobzan_store_jobs` / `jobzan_store_employers` (gauge): store sizes

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("jobzan_http_requests_total", &labels).increment(1);
    histogram!("jobzan_http_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(reason: &'static str) {
    counter!("jobzan_client_retries_total", "reason" => reason).increment(1);
}

pub fn record_client_failure(kind: &'static str) {
    counter!("jobzan_client_failures_total", "kind" => kind).increment(1);
}

pub fn record_store_size(jobs: usize, employers: usize) {
    gauge!("jobzan_store_jobs").set(jobs as f64);
    gauge!("jobzan_store_employers").set(employers as f64);
}
