//! Configuration schema definitions.
//!
//! All types derive Serde traits so the same structure can be read from a
//! TOML file or assembled from command-line flags.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upstreams used when none are configured explicitly.
pub const DEFAULT_NODES: &[&str] = &[
    "https://eth.llamarpc.com",
    "https://ethereum.publicnode.com",
    "https://rpc.flashbots.net/fast",
    "https://rpc.flashbots.net",
    "https://1rpc.io/eth",
    "https://rpc.ankr.com/eth",
    "https://rpc.eth.gateway.fm",
];

/// Root configuration for the balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener settings.
    pub server: ServerConfig,

    /// Upstream JSON-RPC nodes.
    pub reverse: ReverseConfig,

    /// Turn `/healthz` into a live `eth_syncing` probe of the single node.
    pub node_health_proxy: bool,

    /// Periodic counter reporting and exporter settings.
    pub metrics: MetricsConfig,

    /// Enable debug logging.
    pub debug: bool,
}

impl ProxyConfig {
    /// Address the listener binds to, as `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host or IP to listen on.
    pub host: String,

    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Reverse proxy targets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReverseConfig {
    /// Ordered list of upstream URLs. Order defines the round-robin cycle.
    pub nodes: Vec<String>,
}

impl Default for ReverseConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_NODES.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// Metrics reporting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Milliseconds between counter log reports. Zero disables reporting.
    pub interval_ms: u64,

    /// Optional bind address for a Prometheus scrape endpoint.
    pub prometheus_address: Option<String>,
}

impl MetricsConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5 * 60 * 1000,
            prometheus_address: None,
        }
    }
}
