//! Upstream node abstraction.
//!
//! # Responsibilities
//! - Hold the upstream URL and the client used to reach it
//! - Track call outcomes by status class

use axum::http::StatusCode;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Point-in-time copy of a node's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub calls: u64,
    pub calls_2xx: u64,
    pub calls_4xx: u64,
    pub calls_5xx: u64,
}

/// A single upstream JSON-RPC node.
#[derive(Debug)]
pub struct Node {
    /// Upstream target. Requests are rewritten onto this URL.
    url: Url,
    /// Outbound client dedicated to this node.
    client: reqwest::Client,

    calls: AtomicU64,
    calls_2xx: AtomicU64,
    calls_4xx: AtomicU64,
    calls_5xx: AtomicU64,
}

impl Node {
    /// Create a node for the given upstream.
    ///
    /// The client never follows redirects and never decompresses bodies, so
    /// the inspector sees exactly what the upstream sent.
    pub fn new(url: Url) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self::with_client(url, client))
    }

    /// Create a node around an existing client.
    pub fn with_client(url: Url, client: reqwest::Client) -> Self {
        Self {
            url,
            client,
            calls: AtomicU64::new(0),
            calls_2xx: AtomicU64::new(0),
            calls_4xx: AtomicU64::new(0),
            calls_5xx: AtomicU64::new(0),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Record one completed call with its final status.
    ///
    /// Total is always bumped first; at most one class counter follows.
    pub fn record(&self, status: StatusCode) {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let class = match status.as_u16() {
            200..=299 => Some((&self.calls_2xx, "2xx")),
            400..=499 => Some((&self.calls_4xx, "4xx")),
            500..=599 => Some((&self.calls_5xx, "5xx")),
            _ => None,
        };
        let label = match class {
            Some((counter, label)) => {
                counter.fetch_add(1, Ordering::Relaxed);
                label
            }
            None => "other",
        };

        metrics::counter!(
            "rpc_balancer_node_calls_total",
            "node" => self.url.to_string(),
            "class" => label
        )
        .increment(1);
    }

    /// Read all four counters. Loads are independent, so a concurrent
    /// writer may be observed half way through a `record`.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            calls_2xx: self.calls_2xx.load(Ordering::Relaxed),
            calls_4xx: self.calls_4xx.load(Ordering::Relaxed),
            calls_5xx: self.calls_5xx.load(Ordering::Relaxed),
        }
    }
}
