//! Shutdown coordination.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Receiving side of the shutdown signal.
pub type ShutdownReceiver = watch::Receiver<bool>;

/// Process-wide cancellation signal.
///
/// The signal is latched: a receiver created after `trigger()` still sees
/// it. Cloning is cheap; every clone triggers and observes the same signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> ShutdownReceiver {
        self.tx.subscribe()
    }

    /// Fire the signal. Safe to call with no subscribers.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Future resolving once the signal has fired or its sender is gone.
pub fn notified(mut rx: ShutdownReceiver) -> impl Future<Output = ()> + Send + 'static {
    async move {
        let _fired = rx.wait_for(|stopped| *stopped).await.is_ok();
    }
}
