//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, tracing layer)
//!     → /healthz → health::probe (or constant 200)
//!     → /*       → registry select → proxy::forward → proxy::inspector
//!     → Send to client
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
