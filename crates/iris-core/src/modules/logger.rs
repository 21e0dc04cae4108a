//! Tracing subscriber setup shared by the server binary and integration tests.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber.
///
/// `directive` is used when `RUST_LOG` is unset; it accepts anything
/// `EnvFilter` understands (`info`, `iris_core=debug,tower_http=warn`, ...).
pub fn init_logger(directive: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .map_err(|e| format!("Invalid log filter '{}': {}", directive, e))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| format!("Failed to install tracing subscriber: {}", e))
}
