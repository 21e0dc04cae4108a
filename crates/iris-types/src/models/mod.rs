//! Shared data structures used across the gateway.

mod config;
mod generation;

pub use config::{ConfigKey, RuntimeConfig};
pub use generation::{
    ErrorBody, GenerationRequest, GenerationResponse, MediaKind, NormalizedOutput,
};
