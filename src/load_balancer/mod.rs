//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup: configured node URLs
//!     → registry.rs (parse, build one Node per URL, fixed order)
//!
//! Per request:
//!     → registry.rs select() (atomic cursor, round robin)
//!     → node.rs (outbound client + outcome counters)
//! ```
//!
//! # Design Decisions
//! - Selection is blind round robin; latency and error rate are ignored
//! - The node list never changes after startup
//! - Counters are plain atomics owned by each node, never reset

pub mod node;
pub mod registry;

pub use node::{CounterSnapshot, Node};
pub use registry::{NodeRegistry, RegistryError};
