use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of keys the config loader accepts from any source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigKey {
    A2eApiBase,
    A2eApiKey,
    NanoBananaApiBase,
    NanoBananaApiKey,
    GoogleApiKey,
    GoogleApiBase,
    AllowedOrigins,
    Port,
    MaxBodyBytes,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 9] = [
        Self::A2eApiBase,
        Self::A2eApiKey,
        Self::NanoBananaApiBase,
        Self::NanoBananaApiKey,
        Self::GoogleApiKey,
        Self::GoogleApiBase,
        Self::AllowedOrigins,
        Self::Port,
        Self::MaxBodyBytes,
    ];

    /// Keys whose values are secrets and must never reach a client.
    pub const SECRETS: [ConfigKey; 3] =
        [Self::A2eApiKey, Self::NanoBananaApiKey, Self::GoogleApiKey];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A2eApiBase => "A2E_API_BASE",
            Self::A2eApiKey => "A2E_API_KEY",
            Self::NanoBananaApiBase => "NANO_BANANA_API_BASE",
            Self::NanoBananaApiKey => "NANO_BANANA_API_KEY",
            Self::GoogleApiKey => "GOOGLE_API_KEY",
            Self::GoogleApiBase => "GOOGLE_API_BASE",
            Self::AllowedOrigins => "ALLOWED_ORIGINS",
            Self::Port => "PORT",
            Self::MaxBodyBytes => "MAX_BODY_BYTES",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|key| key.as_str() == s).ok_or(())
    }
}
