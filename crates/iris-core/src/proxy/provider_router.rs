//! Logical endpoint -> upstream provider routing.
//!
//! | Endpoint                     | GOOGLE_API_KEY | Route                 |
//! |------------------------------|----------------|-----------------------|
//! | `/v1/nano-banana-pro/images` | unset          | Nano Banana (poll)    |
//! | `/v1/nano-banana-pro/images` | set            | Google Imagen         |
//! | `/v1/gemini/images`          | set            | Google Imagen         |
//! | `/v1/gemini/images`          | unset          | 500, key missing      |
//! | `/v1/a2e/images`             | -              | A2E relay (image)     |
//! | `/v1/a2e/videos`             | -              | A2E relay (video)     |
//!
//! A configured Google key takes over the default image endpoint; that
//! preference is applied here and nowhere else.

use iris_types::{ConfigKey, MediaKind, ProxyError, RuntimeConfig};

pub const API_PREFIX: &str = "/api";

/// Client-facing generation capability, independent of the upstream serving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalEndpoint {
    NanoBananaImages,
    A2eImages,
    A2eVideos,
    GeminiImages,
}

impl LogicalEndpoint {
    pub const ALL: [LogicalEndpoint; 4] =
        [Self::NanoBananaImages, Self::A2eImages, Self::A2eVideos, Self::GeminiImages];

    pub fn path(self) -> &'static str {
        match self {
            Self::NanoBananaImages => "/v1/nano-banana-pro/images",
            Self::A2eImages => "/v1/a2e/images",
            Self::A2eVideos => "/v1/a2e/videos",
            Self::GeminiImages => "/v1/gemini/images",
        }
    }

    /// Exact match against the logical path (prefix already stripped).
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|endpoint| endpoint.path() == path)
    }

    /// Strip the `/api` prefix from a request path and match what remains.
    pub fn from_request_path(request_path: &str) -> Option<Self> {
        request_path.strip_prefix(API_PREFIX).and_then(Self::from_path)
    }

    /// Endpoints served by Google Imagen whenever a Google key is configured.
    pub fn prefers_google(self) -> bool {
        matches!(self, Self::NanoBananaImages | Self::GeminiImages)
    }

    pub fn media_kind(self) -> MediaKind {
        match self {
            Self::A2eVideos => MediaKind::Video,
            Self::NanoBananaImages | Self::A2eImages | Self::GeminiImages => MediaKind::Image,
        }
    }
}

/// Base URL plus bearer key for one provider family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRoute {
    /// Asynchronous generate-then-poll image provider.
    NanoBanana(Credential),
    /// Synchronous pass-through provider; `path` is appended to the base.
    A2eRelay { credential: Credential, kind: MediaKind, path: &'static str },
    /// Google Imagen predict endpoint; the key travels as a query parameter.
    Imagen(Credential),
}

impl ProviderRoute {
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::NanoBanana(_) => "nano-banana",
            Self::A2eRelay { .. } => "a2e",
            Self::Imagen(_) => "google-imagen",
        }
    }
}

/// Pick the upstream for `endpoint` given the current config snapshot.
pub fn resolve(endpoint: LogicalEndpoint, config: &RuntimeConfig) -> Result<ProviderRoute, ProxyError> {
    let google_key = config.get(ConfigKey::GoogleApiKey);

    if let (true, Some(api_key)) = (endpoint.prefers_google(), google_key) {
        return Ok(ProviderRoute::Imagen(Credential {
            base_url: config.google_api_base().to_string(),
            api_key: api_key.to_string(),
        }));
    }

    match endpoint {
        LogicalEndpoint::GeminiImages => {
            Err(ProxyError::MissingKey { key: ConfigKey::GoogleApiKey.to_string() })
        },
        LogicalEndpoint::NanoBananaImages => {
            let base_url = config.nano_banana_api_base();
            let (api_key, key_label) = match config.get(ConfigKey::NanoBananaApiKey) {
                Some(key) => (Some(key), ConfigKey::NanoBananaApiKey),
                None => (config.get(ConfigKey::A2eApiKey), ConfigKey::A2eApiKey),
            };
            let credential =
                require(Some(base_url), api_key, ConfigKey::NanoBananaApiBase, key_label)?;
            Ok(ProviderRoute::NanoBanana(credential))
        },
        LogicalEndpoint::A2eImages | LogicalEndpoint::A2eVideos => {
            let credential = require(
                config.get(ConfigKey::A2eApiBase),
                config.get(ConfigKey::A2eApiKey),
                ConfigKey::A2eApiBase,
                ConfigKey::A2eApiKey,
            )?;
            Ok(ProviderRoute::A2eRelay {
                credential,
                kind: endpoint.media_kind(),
                path: endpoint.path(),
            })
        },
    }
}

fn require(
    base_url: Option<&str>,
    api_key: Option<&str>,
    base_label: ConfigKey,
    key_label: ConfigKey,
) -> Result<Credential, ProxyError> {
    match (base_url, api_key) {
        (Some(base_url), Some(api_key)) => {
            Ok(Credential { base_url: base_url.to_string(), api_key: api_key.to_string() })
        },
        _ => Err(ProxyError::MissingCredentials {
            base_key: base_label.to_string(),
            api_key: key_label.to_string(),
        }),
    }
}
