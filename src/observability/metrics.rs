//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by method, status
//! - `gate_request_duration_seconds` (histogram): latency distribution
//! - `gate_requests_rejected_total` (counter): feature gate rejections
//! - `gate_routes` (gauge): routes in the active table
//! - `gate_routes_suppressed` (gauge): suppressed routes in the active table
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels stay low-cardinality (method, status)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gate_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gate_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_rejected() {
    counter!("gate_requests_rejected_total").increment(1);
}

pub fn record_route_table(total: usize, suppressed: usize) {
    gauge!("gate_routes").set(total as f64);
    gauge!("gate_routes_suppressed").set(suppressed as f64);
}
