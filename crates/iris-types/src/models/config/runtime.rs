//! Immutable snapshot of the recognized configuration values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::keys::ConfigKey;
use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_BODY_BYTES: usize = 20_000_000;
pub const DEFAULT_NANO_BANANA_API_BASE: &str = "https://gateway.bananapro.site";
pub const DEFAULT_GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// One generation of merged configuration.
///
/// Produced wholesale by the config loader and never mutated afterwards;
/// empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    values: BTreeMap<ConfigKey, String>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: ConfigKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Store a value, ignoring empty strings.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.values.insert(key, value);
        }
    }

    pub fn with(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn port(&self) -> Result<u16, ConfigError> {
        self.parse_or(ConfigKey::Port, DEFAULT_PORT)
    }

    pub fn max_body_bytes(&self) -> Result<usize, ConfigError> {
        self.parse_or(ConfigKey::MaxBodyBytes, DEFAULT_MAX_BODY_BYTES)
    }

    /// Comma-separated `ALLOWED_ORIGINS`, trimmed, empties dropped.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.get(ConfigKey::AllowedOrigins)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn nano_banana_api_base(&self) -> &str {
        self.get(ConfigKey::NanoBananaApiBase).unwrap_or(DEFAULT_NANO_BANANA_API_BASE)
    }

    pub fn google_api_base(&self) -> &str {
        self.get(ConfigKey::GoogleApiBase).unwrap_or(DEFAULT_GOOGLE_API_BASE)
    }

    /// Currently configured secret values (API keys), in a stable order.
    pub fn secrets(&self) -> Vec<&str> {
        ConfigKey::SECRETS.iter().filter_map(|key| self.get(*key)).collect()
    }

    fn parse_or<T: std::str::FromStr>(&self, key: ConfigKey, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::new();
        assert_eq!(config.port(), Ok(8080));
        assert_eq!(config.max_body_bytes(), Ok(20_000_000));
        assert_eq!(config.nano_banana_api_base(), DEFAULT_NANO_BANANA_API_BASE);
        assert_eq!(config.google_api_base(), DEFAULT_GOOGLE_API_BASE);
        assert!(config.allowed_origins().is_empty());
        assert!(config.secrets().is_empty());
    }

    #[test]
    fn test_empty_values_are_not_stored() {
        let config = RuntimeConfig::new().with(ConfigKey::A2eApiKey, "");
        assert!(!config.contains(ConfigKey::A2eApiKey));
    }

    #[test]
    fn test_allowed_origins_parsing() {
        let config = RuntimeConfig::new().with(
            ConfigKey::AllowedOrigins,
            " https://a.example , ,https://b.example,",
        );
        assert_eq!(config.allowed_origins(), vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_invalid_port_is_reported() {
        let config = RuntimeConfig::new().with(ConfigKey::Port, "http");
        assert_eq!(
            config.port(),
            Err(ConfigError::InvalidValue { key: "PORT".to_string(), value: "http".to_string() })
        );
    }

    #[test]
    fn test_secrets_lists_only_keys() {
        let config = RuntimeConfig::new()
            .with(ConfigKey::A2eApiBase, "https://a2e.example")
            .with(ConfigKey::A2eApiKey, "a2e-secret-value")
            .with(ConfigKey::GoogleApiKey, "google-secret-value");
        assert_eq!(config.secrets(), vec!["a2e-secret-value", "google-secret-value"]);
    }
}
