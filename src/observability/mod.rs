//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every subsystem emits tracing events
//!     → logging.rs (subscriber, level chosen by --debug / RUST_LOG)
//!
//! Node counters (load_balancer::node)
//!     → reporter.rs (periodic log lines, one per node)
//!     → metrics.rs (optional Prometheus scrape endpoint)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted messages
//! - Counters are atomics read without locking; a report may be slightly stale
//! - Nothing is persisted

pub mod logging;
pub mod metrics;
pub mod reporter;

pub use reporter::MetricsReporter;
