//! Provider adapters: one per upstream family.
//!
//! Each adapter turns the generic [`GenerationRequest`] into the provider's
//! native call and maps the native answer back to a [`ProviderOutcome`].

pub mod a2e;
pub mod imagen;
pub mod nano_banana;

use async_trait::async_trait;
use bytes::Bytes;
use iris_types::{GenerationRequest, NormalizedOutput, ProxyError};
use url::Url;

use crate::proxy::provider_router::ProviderRoute;

pub use nano_banana::PollSettings;

/// What an adapter hands back on success.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    /// Normalized assets, serialized as `{ "data": [...] }`.
    Normalized(Vec<NormalizedOutput>),
    /// Upstream answer relayed verbatim.
    Relayed { status: u16, content_type: String, body: Bytes },
}

/// Per-request input shared by all adapters.
#[derive(Debug, Clone, Copy)]
pub struct ProviderCall<'a> {
    pub request: &'a GenerationRequest,
    pub body: &'a Bytes,
    /// Raw client query string, without the leading `?`.
    pub query: Option<&'a str>,
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    async fn execute(&self, call: ProviderCall<'_>) -> Result<ProviderOutcome, ProxyError>;
}

/// Instantiate the adapter serving `route`.
pub fn adapter_for(
    route: ProviderRoute,
    client: reqwest::Client,
    poll: PollSettings,
) -> Box<dyn ProviderAdapter> {
    match route {
        ProviderRoute::NanoBanana(credential) => {
            Box::new(nano_banana::NanoBananaAdapter::new(client, credential, poll))
        },
        ProviderRoute::A2eRelay { credential, kind, path } => {
            Box::new(a2e::A2eRelayAdapter::new(client, credential, kind, path))
        },
        ProviderRoute::Imagen(credential) => Box::new(imagen::ImagenAdapter::new(client, credential)),
    }
}

/// Resolve an absolute `path` against a configured base URL.
pub(crate) fn join_url(base: &str, path: &str) -> Result<Url, ProxyError> {
    Url::parse(base)
        .and_then(|base| base.join(path))
        .map_err(|e| ProxyError::Internal { message: format!("invalid upstream base {}: {}", base, e) })
}

pub(crate) fn network_error(provider: &str, err: &reqwest::Error) -> ProxyError {
    // reqwest errors embed the request URL, which may carry a key; callers scrub.
    ProxyError::Network { provider: provider.to_string(), message: err.to_string() }
}
