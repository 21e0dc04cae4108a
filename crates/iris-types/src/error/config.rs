//! Configuration-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or interpreting configuration.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ConfigError {
    /// A config file exists but could not be read
    #[error("Config read error at {path}: {message}")]
    ReadFailed {
        /// Filesystem path of the unreadable source
        path: String,
        /// Description of the IO failure
        message: String,
    },

    /// A recognized key holds a value that cannot be interpreted
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Name of the offending key
        key: String,
        /// The raw value as loaded
        value: String,
    },
}

impl ConfigError {
    pub fn read_failed(path: impl std::fmt::Display, err: &std::io::Error) -> Self {
        Self::ReadFailed { path: path.to_string(), message: err.to_string() }
    }
}
