//! Round-robin node registry.

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::config::validation::{parse_node_url, ValidationError};
use crate::config::ProxyConfig;
use crate::load_balancer::node::Node;

/// Errors that prevent the registry from being built.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Config(#[from] ValidationError),

    #[error("failed to build client for node '{url}': {source}")]
    Client {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Fixed, ordered set of nodes plus a shared round-robin cursor.
#[derive(Debug)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    cursor: AtomicU64,
}

impl NodeRegistry {
    /// Build a registry from configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, RegistryError> {
        let nodes = &config.reverse.nodes;
        if config.node_health_proxy && nodes.len() > 1 {
            return Err(ValidationError::HealthProxyNodeCount(nodes.len()).into());
        }

        let nodes = nodes
            .iter()
            .map(|raw| -> Result<Node, RegistryError> {
                let url = parse_node_url(raw)?;
                Node::new(url).map_err(|source| RegistryError::Client {
                    url: raw.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(nodes)
    }

    /// Build a registry from already constructed nodes.
    pub fn new(nodes: Vec<Node>) -> Result<Self, RegistryError> {
        if nodes.is_empty() {
            return Err(ValidationError::NoNodes.into());
        }
        Ok(Self {
            nodes,
            cursor: AtomicU64::new(0),
        })
    }

    /// Pick the next node.
    ///
    /// The cursor is incremented before use, so a fresh registry hands out
    /// index `1 % len` first.
    pub fn select(&self) -> &Node {
        let next = self.cursor.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let index = (next % self.nodes.len() as u64) as usize;
        tracing::debug!(index, "round robin: next");
        &self.nodes[index]
    }

    /// All nodes in configuration order.
    pub fn all(&self) -> &[Node] {
        &self.nodes
    }

    /// The only node, when exactly one is configured.
    pub fn single(&self) -> Option<&Node> {
        match self.nodes.as_slice() {
            [node] => Some(node),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
