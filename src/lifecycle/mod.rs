//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → NodeRegistry → exporter → listener → reporter → serve
//!
//! Shutdown (shutdown.rs):
//!     trigger() → listener stops accepting, reporter exits
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → trigger()
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last, after every subsystem is ready
//! - In-flight requests are not drained against a deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownReceiver};
pub use startup::StartupError;
