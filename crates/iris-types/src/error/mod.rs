//! Typed error definitions for the gateway.
//!
//! All errors are:
//!
//! - **Serializable** for diagnostics via serde
//! - **Displayable** for client payloads and logging via Display
//! - **Matchable** for status mapping via enum variants

mod config;
mod proxy;

pub use config::ConfigError;
pub use proxy::ProxyError;
