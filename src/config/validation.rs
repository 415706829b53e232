//! Configuration validation.
//!
//! Validation is a pure function over [`ProxyConfig`] that returns every
//! problem found, not just the first one.

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no upstream nodes specified")]
    NoNodes,

    #[error("can't parse node url '{url}': {reason}")]
    InvalidNodeUrl { url: String, reason: String },

    #[error("node url '{0}' must be an absolute http(s) url with a host")]
    UnsupportedNodeUrl(String),

    #[error("node health proxy requires exactly one node, got {0}")]
    HealthProxyNodeCount(usize),

    #[error("server port must be non-zero")]
    ZeroPort,

    #[error("invalid prometheus address '{0}'")]
    InvalidPrometheusAddress(String),
}

/// Parse a node address into an upstream URL usable as a proxy target.
pub fn parse_node_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidNodeUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ValidationError::UnsupportedNodeUrl(raw.to_string()));
    }
    Ok(url)
}

/// Check the configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let nodes = &config.reverse.nodes;

    if nodes.is_empty() {
        errors.push(ValidationError::NoNodes);
    }
    for node in nodes {
        if let Err(e) = parse_node_url(node) {
            errors.push(e);
        }
    }
    if config.node_health_proxy && nodes.len() > 1 {
        errors.push(ValidationError::HealthProxyNodeCount(nodes.len()));
    }
    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if let Some(addr) = &config.metrics.prometheus_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidPrometheusAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
