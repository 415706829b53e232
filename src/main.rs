//! rpc-balancer
//!
//! A round-robin reverse proxy in front of several JSON-RPC blockchain
//! nodes.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                 RPC BALANCER                 │
//!                          │                                              │
//!     Client Request       │  ┌─────────┐    ┌───────────────┐            │
//!     ─────────────────────┼─▶│  http   │───▶│ load_balancer │            │
//!                          │  │ server  │    │  round robin  │            │
//!                          │  └─────────┘    └───────┬───────┘            │
//!                          │                         ▼                    │
//!     Client Response      │  ┌───────────┐    ┌───────────┐              │
//!     ◀────────────────────┼──│ inspector │◀───│  forward  │◀─────────────┼──── JSON-RPC
//!                          │  │  (429 on  │    │ (per-node │              │     Node
//!                          │  │  "error") │    │  client)  │              │
//!                          │  └───────────┘    └───────────┘              │
//!                          │                                              │
//!                          │  health probe · metrics reporter · lifecycle │
//!                          └──────────────────────────────────────────────┘
//! ```

use clap::Parser;

use rpc_balancer::config::cli::Cli;
use rpc_balancer::config::loader::{self, load_config};
use rpc_balancer::lifecycle::{signals, startup, Shutdown};
use rpc_balancer::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path),
        None => loader::validated(cli.to_config()),
    };
    let config = match config {
        Ok(config) => {
            logging::init(config.debug);
            config
        }
        Err(e) => {
            logging::init(cli.debug);
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        bind_address = %config.bind_address(),
        nodes = ?config.reverse.nodes,
        metrics_interval = ?config.metrics.interval(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(signals::wait_for_interrupt(shutdown.clone()));

    if let Err(e) = startup::run(config, shutdown).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    tracing::debug!("proxy server stopped");
    Ok(())
}
