//! Metrics collection and exposition.
//!
//! # Metrics
//! - `maintenance_decisions_total` (counter): requests by `decision`
//!   (`pass`, `intercept`)
//! - `maintenance_reloads_total` (counter): configuration updates by
//!   `outcome` (`applied`, `rejected`)

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(decision: &'static str) {
    ::metrics::counter!("maintenance_decisions_total", "decision" => decision).increment(1);
}

pub fn record_reload(outcome: &'static str) {
    ::metrics::counter!("maintenance_reloads_total", "outcome" => outcome).increment(1);
}
