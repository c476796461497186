//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): calls by method, status, outcome
//! - `proxy_request_duration_seconds` (histogram): end-to-end call latency
//!
//! Outcome labels: `forwarded`, `transport_error`, `auth_failed`, `invalid`.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one forwarding call.
pub fn record_request(method: &str, status: u16, outcome: &str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_uppercase(),
        "status" => status.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_uppercase(),
        "outcome" => outcome.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
