//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C (SIGINT) and fire `shutdown`.
pub async fn wait_for_interrupt(shutdown: Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt, shutting down"),
    }
    shutdown.trigger();
}
