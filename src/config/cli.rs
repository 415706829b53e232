//! Command-line flags.
//!
//! Flag names keep the dotted `section.key` form so they line up with the
//! sections of the TOML file.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::schema::{
    MetricsConfig, ProxyConfig, ReverseConfig, ServerConfig, DEFAULT_NODES,
};

#[derive(Debug, Parser)]
#[command(name = "rpc-balancer")]
#[command(about = "Round-robin reverse proxy for JSON-RPC blockchain nodes", long_about = None)]
pub struct Cli {
    /// Load configuration from a TOML file instead of flags
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// http host to listen on
    #[arg(long = "server.host", default_value = "0.0.0.0")]
    pub host: String,

    /// http port to listen on
    #[arg(long = "server.port", default_value_t = 8080)]
    pub port: u16,

    /// ethereum nodes to reverse proxy to (repeatable)
    #[arg(long = "reverse.nodes", default_values = DEFAULT_NODES.iter().copied())]
    pub nodes: Vec<String>,

    /// proxy `eth_syncing` on /healthz; requires exactly one node
    #[arg(long = "node-health-proxy")]
    pub node_health_proxy: bool,

    /// print metrics interval, set to 0 to disable
    #[arg(long = "metrics.interval", default_value = "5m", value_parser = humantime::parse_duration)]
    pub metrics_interval: Duration,

    /// serve Prometheus metrics on this address
    #[arg(long = "metrics.prometheus-address")]
    pub prometheus_address: Option<String>,

    /// debug mode
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Build a configuration from the flags alone.
    pub fn to_config(&self) -> ProxyConfig {
        ProxyConfig {
            server: ServerConfig {
                host: self.host.clone(),
                port: self.port,
            },
            reverse: ReverseConfig {
                nodes: self.nodes.clone(),
            },
            node_health_proxy: self.node_health_proxy,
            metrics: MetricsConfig {
                interval_ms: self.metrics_interval.as_millis() as u64,
                prometheus_address: self.prometheus_address.clone(),
            },
            debug: self.debug,
        }
    }
}
