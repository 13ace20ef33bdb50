//! Lifecycle metrics.
//!
//! # Metrics
//! - `server_start_total` (counter): start outcomes by kind
//!   (`started`, `exited`, `failed`, `invalid`, `aborted`)
//! - `server_late_failures_total` (counter): accept loops that failed after
//!   the startup window
//! - `server_ready_checks_total` (counter): readiness probes by result
//! - `server_stop_total` (counter): stop outcomes by kind
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::transport::TransportKind;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_start(kind: TransportKind, outcome: &'static str) {
    ::metrics::counter!("server_start_total", "kind" => kind.as_str(), "outcome" => outcome).increment(1);
}

pub fn record_late_failure(kind: TransportKind) {
    ::metrics::counter!("server_late_failures_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_ready(kind: TransportKind, ready: bool) {
    let ready = if ready { "true" } else { "false" };
    ::metrics::counter!("server_ready_checks_total", "kind" => kind.as_str(), "ready" => ready).increment(1);
}

pub fn record_stop(kind: TransportKind, outcome: &'static str) {
    ::metrics::counter!("server_stop_total", "kind" => kind.as_str(), "outcome" => outcome).increment(1);
}
