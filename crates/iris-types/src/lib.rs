//! # Iris Types
//!
//! Core types, config keys, and error definitions for the Camera Iris gateway.
//!
//! - **`error`** - Typed error hierarchy for the proxy and configuration
//! - **`models`** - Config keys, runtime config snapshots, generation request/response shapes
//!
//! ## Architecture Role
//!
//! `iris-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!   iris-types (this crate)
//!         │
//!         ▼
//!     iris-core
//!         │
//!         ▼
//!    iris-server
//! ```

pub mod error;
pub mod models;

pub use error::{ConfigError, ProxyError};

pub use models::{
    ConfigKey, ErrorBody, GenerationRequest, GenerationResponse, MediaKind, NormalizedOutput,
    RuntimeConfig,
};
