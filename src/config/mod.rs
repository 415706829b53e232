//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command-line flags (cli.rs)    or    TOML file (loader.rs)
//!     → ProxyConfig (schema.rs)
//!     → validation.rs (semantic checks, all errors collected)
//!     → validated, immutable config handed to startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Any validation error is fatal at startup

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{MetricsConfig, ProxyConfig, ReverseConfig, ServerConfig};
