//! Request dispatch and response inspection.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → forward.rs (rewrite URL/headers onto the selected node, send)
//!     → upstream response buffered
//!     → inspector.rs (decode, look for an `error` field, override status)
//!     → node counters updated
//!     → client receives the original bytes
//! ```
//!
//! # Design Decisions
//! - Whole bodies are buffered; inspection needs the complete document
//! - Decoding is for inspection only, the client gets what the node sent
//! - Nothing here is retried

pub mod forward;
pub mod inspector;

pub use forward::{forward, ProxyError};
pub use inspector::{inspect, respond, InspectError, InspectionDecision};
