//! Prometheus exposition of node counters.
//!
//! Nodes mirror every recorded call into the `metrics` facade as
//! `rpc_balancer_node_calls_total{node, class}`. Installing the exporter
//! makes those counters scrapeable; without it the facade is a no-op.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Start the Prometheus HTTP listener. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}
