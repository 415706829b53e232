//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "rpc_balancer=debug,tower_http=debug"
    } else {
        "rpc_balancer=info"
    }
}

/// Install the global tracing subscriber.
pub fn init(debug: bool) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
