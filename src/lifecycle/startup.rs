//! Startup orchestration.

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::load_balancer::{NodeRegistry, RegistryError};
use crate::observability::{metrics, MetricsReporter};

/// Anything that stops the proxy from starting or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid prometheus address '{0}'")]
    PrometheusAddress(String),

    #[error("failed to install prometheus exporter: {0}")]
    Exporter(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bring up every subsystem and serve until `shutdown` fires.
pub async fn run(config: ProxyConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let registry = Arc::new(NodeRegistry::from_config(&config)?);
    tracing::info!(
        nodes = registry.len(),
        node_health_proxy = config.node_health_proxy,
        "Node registry ready"
    );

    if let Some(addr) = &config.metrics.prometheus_address {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| StartupError::PrometheusAddress(addr.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let server = HttpServer::new(registry.clone(), config.node_health_proxy)?;

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    MetricsReporter::new(registry, config.metrics.interval()).spawn(shutdown.subscribe());

    tracing::info!("proxy server started at http://{}", address);
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
