//! # Core
//!
//! Application plumbing shared by every front end.
//!
//! - [`config`]: `~/.noor/config.toml` loading and override resolution
//! - [`request`]: request tokens that let a view drop stale responses

pub mod config;
pub mod request;

pub use config::{ConfigError, NoorConfig, ResolvedConfig};
pub use request::{RequestScope, RequestToken};
