//! Layered configuration loading.
//!
//! Sources, lowest to highest precedence among files:
//!
//! 1. `<config_dir>/.env` - fills keys nothing else has set
//! 2. `<config_dir>/secure-keys/.env` - overrides file-sourced values
//! 3. `<config_dir>/secure-keys/api-key.txt`, `<config_dir>/apikeys.env/api-key.txt` -
//!    loose key files, `KEY=value` lines or a single bare token
//!
//! Values captured from the process environment when the provider is built
//! always win and are never overridden by any file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use iris_types::{ConfigError, ConfigKey, RuntimeConfig};
use tokio::sync::RwLock;

const ROOT_ENV_FILE: &str = ".env";
const SECURE_ENV_FILE: &str = "secure-keys/.env";
const LOOSE_KEY_FILES: [&str; 2] = ["secure-keys/api-key.txt", "apikeys.env/api-key.txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precedence {
    /// Only set keys that are still unset.
    FillMissing,
    /// Replace anything not sourced from the process environment.
    OverrideFiles,
}

/// Owns the current configuration snapshot and rebuilds it on demand.
pub struct ConfigProvider {
    config_dir: PathBuf,
    environment: RuntimeConfig,
    current: RwLock<Arc<RuntimeConfig>>,
}

impl ConfigProvider {
    /// Build a provider whose environment layer is the given snapshot.
    pub fn new(config_dir: impl Into<PathBuf>, environment: RuntimeConfig) -> Self {
        let current = RwLock::new(Arc::new(environment.clone()));
        Self { config_dir: config_dir.into(), environment, current }
    }

    /// Build a provider capturing recognized keys from the process environment.
    pub fn from_process_env(config_dir: impl Into<PathBuf>) -> Self {
        let mut environment = RuntimeConfig::new();
        for key in ConfigKey::ALL {
            if let Ok(value) = std::env::var(key.as_str()) {
                environment.set(key, value);
            }
        }
        Self::new(config_dir, environment)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Current snapshot without touching the filesystem.
    pub async fn snapshot(&self) -> Arc<RuntimeConfig> {
        self.current.read().await.clone()
    }

    /// Non-blocking [`Self::snapshot`]; `None` while a reload holds the lock.
    pub fn try_snapshot(&self) -> Option<Arc<RuntimeConfig>> {
        self.current.try_read().ok().map(|guard| guard.clone())
    }

    /// Re-read every source, swap in the merged snapshot, and return it.
    pub async fn reload(&self) -> Arc<RuntimeConfig> {
        let mut merged = self.environment.clone();

        if let Some(content) = read_optional(&self.config_dir.join(ROOT_ENV_FILE)).await {
            self.apply(&mut merged, parse_env_file(&content), Precedence::FillMissing);
        }
        if let Some(content) = read_optional(&self.config_dir.join(SECURE_ENV_FILE)).await {
            self.apply(&mut merged, parse_env_file(&content), Precedence::OverrideFiles);
        }
        for loose in LOOSE_KEY_FILES {
            if let Some(content) = read_optional(&self.config_dir.join(loose)).await {
                self.apply(&mut merged, parse_loose_file(&content), Precedence::OverrideFiles);
            }
        }

        let snapshot = Arc::new(merged);
        *self.current.write().await = snapshot.clone();
        snapshot
    }

    fn apply(
        &self,
        merged: &mut RuntimeConfig,
        entries: Vec<(ConfigKey, String)>,
        precedence: Precedence,
    ) {
        for (key, value) in entries {
            let unset = !merged.contains(key);
            let overridable =
                precedence == Precedence::OverrideFiles && !self.environment.contains(key);
            if unset || overridable {
                merged.set(key, value);
            }
        }
    }
}

async fn read_optional(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!("Skipping config source: {}", ConfigError::read_failed(path.display(), &e));
            None
        },
    }
}

/// Parse `KEY=value` lines, keeping only recognized keys.
fn parse_env_file(content: &str) -> Vec<(ConfigKey, String)> {
    content
        .lines()
        .filter_map(meaningful_line)
        .filter_map(|line| line.split_once('='))
        .filter_map(|(key, value)| {
            let key = key.trim().parse::<ConfigKey>().ok()?;
            Some((key, unquote(value.trim()).to_string()))
        })
        .collect()
}

/// Like [`parse_env_file`], but a line without `=` is a bare token; the first
/// one becomes both generation-provider keys.
fn parse_loose_file(content: &str) -> Vec<(ConfigKey, String)> {
    let mut entries = Vec::new();
    let mut first_token: Option<&str> = None;

    for line in content.lines().filter_map(meaningful_line) {
        match line.split_once('=') {
            Some((key, value)) => {
                if let Ok(key) = key.trim().parse::<ConfigKey>() {
                    entries.push((key, unquote(value.trim()).to_string()));
                }
            },
            None => {
                first_token.get_or_insert(line);
            },
        }
    }

    if let Some(token) = first_token {
        entries.push((ConfigKey::A2eApiKey, token.to_string()));
        entries.push((ConfigKey::NanoBananaApiKey, token.to_string()));
    }
    entries
}

fn meaningful_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    (!trimmed.is_empty() && !trimmed.starts_with('#')).then_some(trimmed)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
