//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the axum router and its handlers
//! - Dispatch each request to a node chosen by the registry
//! - Serve `/healthz`, optionally through the live probe
//! - Stop accepting on shutdown

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::validation::ValidationError;
use crate::health::HealthProbe;
use crate::lifecycle::shutdown::{notified, ShutdownReceiver};
use crate::load_balancer::{NodeRegistry, RegistryError};
use crate::proxy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<NodeRegistry>,
    pub probe: Option<HealthProbe>,
}

/// HTTP server for the balancer.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server over `registry`.
    ///
    /// With `health_proxy` set, the registry must hold exactly one node.
    pub fn new(registry: Arc<NodeRegistry>, health_proxy: bool) -> Result<Self, RegistryError> {
        let probe = if health_proxy {
            let node = registry
                .single()
                .ok_or(ValidationError::HealthProxyNodeCount(registry.len()))?;
            Some(HealthProbe::new(node.url().clone()))
        } else {
            None
        };

        let state = AppState { registry, probe };
        Ok(Self {
            router: Self::build_router(state),
        })
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/healthz", any(health_handler))
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownReceiver,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(notified(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward to the next node in round-robin order.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let node = state.registry.select();
    match proxy::forward(node, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(node = %node.url(), error = %e, "proxy request failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> Response {
    match &state.probe {
        Some(probe) => probe.check().await.into_response(),
        None => StatusCode::OK.into_response(),
    }
}
