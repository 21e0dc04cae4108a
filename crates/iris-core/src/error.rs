//! Unified error types for Iris Core.

use thiserror::Error;

/// Error type for infrastructure operations (startup, config, IO).
///
/// Request-level failures use [`iris_types::ProxyError`] instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// The shared upstream HTTP client could not be built.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File system or socket I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A startup-only config value could not be interpreted.
    #[error("Configuration error: {0}")]
    Config(#[from] iris_types::ConfigError),
}

/// Result type alias for Iris operations.
pub type AppResult<T> = Result<T, AppError>;
