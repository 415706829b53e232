//! Periodic counter reporting.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::lifecycle::shutdown::{notified, ShutdownReceiver};
use crate::load_balancer::{CounterSnapshot, NodeRegistry};

/// Logs every node's counters on a fixed interval.
pub struct MetricsReporter {
    registry: Arc<NodeRegistry>,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(registry: Arc<NodeRegistry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Start the reporter. A zero interval disables it and nothing is spawned.
    pub fn spawn(self, shutdown: ShutdownReceiver) -> Option<JoinHandle<()>> {
        if self.interval.is_zero() {
            tracing::debug!("Metrics reporting disabled");
            return None;
        }
        Some(tokio::spawn(self.run(shutdown)))
    }

    /// Report until shutdown fires. The first report comes one full
    /// interval after start.
    pub async fn run(self, shutdown: ShutdownReceiver) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        let stop = notified(shutdown);
        tokio::pin!(stop);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.report(),
                _ = &mut stop => {
                    tracing::debug!("Metrics reporter received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Current counters of every node, in registry order.
    pub fn snapshots(&self) -> Vec<(String, CounterSnapshot)> {
        self.registry
            .all()
            .iter()
            .map(|node| (node.url().to_string(), node.snapshot()))
            .collect()
    }

    /// Emit one line per node, in registry order.
    pub fn report(&self) {
        tracing::info!("==============================metrics start==============================");
        for (node, snap) in self.snapshots() {
            tracing::info!(
                node = %node,
                calls = snap.calls,
                calls_2xx = snap.calls_2xx,
                calls_4xx = snap.calls_4xx,
                calls_5xx = snap.calls_5xx,
                "node metrics"
            );
        }
    }
}
