//! Secret scrubbing for client-visible error text and log lines.
//!
//! Pattern: every message derived from upstream text (or from anything that
//! may echo a request URL) passes through [`SecretScrubber::scrub`] before it
//! is placed in an `error` payload or logged.

use iris_types::RuntimeConfig;

pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Secrets this short are skipped to avoid mangling unrelated text.
const MIN_SECRET_LEN: usize = 9;

#[derive(Debug, Clone, Default)]
pub struct SecretScrubber {
    secrets: Vec<String>,
}

impl SecretScrubber {
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut secrets: Vec<String> = secrets
            .into_iter()
            .map(Into::into)
            .filter(|s| s.len() >= MIN_SECRET_LEN)
            .collect();
        // Longest first so a secret containing another is redacted whole.
        secrets.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        secrets.dedup();
        Self { secrets }
    }

    /// Scrubber for the API keys in a config snapshot.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.secrets())
    }

    pub fn scrub(&self, text: &str) -> String {
        let mut scrubbed = text.to_string();
        for secret in &self.secrets {
            if scrubbed.contains(secret.as_str()) {
                scrubbed = scrubbed.replace(secret.as_str(), REDACTION_MARKER);
            }
        }
        scrubbed
    }
}
