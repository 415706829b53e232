//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /healthz
//!     → probe disabled: 200 OK
//!     → probe enabled (single node):
//!         probe.rs builds an eth_syncing call
//!         → sends it with its own client (5s deadline)
//!         → maps the outcome to 200 / 500 / 502 / 503
//! ```
//!
//! # Design Decisions
//! - One synthetic call per health request, never retried
//! - The probe client is separate from the node transports

pub mod probe;

pub use probe::{HealthProbe, ProbeOutcome, PROBE_TIMEOUT};
