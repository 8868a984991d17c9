//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define lifecycle metrics (maintenance outcomes, server stops, shutdown time)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `maintenance_cycles_total` (counter): cleanup cycles by outcome
//! - `server_stops_total` (counter): protocol server stops by server, outcome
//! - `shutdown_duration_seconds` (histogram): signal-to-stopped latency
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are static strings only

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_maintenance_cycle(outcome: &'static str) {
    counter!("maintenance_cycles_total", "outcome" => outcome).increment(1);
}

pub fn record_server_stop(server: &'static str, outcome: &'static str) {
    counter!("server_stops_total", "server" => server, "outcome" => outcome).increment(1);
}

pub fn record_shutdown(elapsed: Duration) {
    histogram!("shutdown_duration_seconds").record(elapsed.as_secs_f64());
}
