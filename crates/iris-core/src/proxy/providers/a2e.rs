//! A2E: synchronous pass-through for image and video generation.

use async_trait::async_trait;
use bytes::Bytes;
use iris_types::{MediaKind, ProxyError};
use reqwest::header;

use super::{join_url, network_error, ProviderAdapter, ProviderCall, ProviderOutcome};
use crate::proxy::common::upstream_body::UpstreamBody;
use crate::proxy::provider_router::Credential;

pub const PROVIDER: &str = "A2E";

const DEFAULT_CONTENT_TYPE: &str = "application/json";

pub struct A2eRelayAdapter {
    client: reqwest::Client,
    credential: Credential,
    kind: MediaKind,
    path: &'static str,
}

impl A2eRelayAdapter {
    pub fn new(
        client: reqwest::Client,
        credential: Credential,
        kind: MediaKind,
        path: &'static str,
    ) -> Self {
        Self { client, credential, kind, path }
    }
}

#[async_trait]
impl ProviderAdapter for A2eRelayAdapter {
    async fn execute(&self, call: ProviderCall<'_>) -> Result<ProviderOutcome, ProxyError> {
        let mut url = join_url(&self.credential.base_url, self.path)?;
        url.set_query(call.query.filter(|q| !q.is_empty()));

        tracing::info!(
            "[A2E] Relaying {} request to {} ({} bytes)",
            self.kind.as_str(),
            self.path,
            call.body.len()
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.credential.api_key)
            .header(header::CONTENT_TYPE, DEFAULT_CONTENT_TYPE)
            .body(call.body.clone())
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, &e))?;
        let upstream = UpstreamBody::read(response, PROVIDER).await?;

        if upstream.looks_like_html() {
            tracing::warn!("[A2E] Upstream answered {} with an HTML document", upstream.status);
            return Err(ProxyError::UnexpectedHtml { upstream_status: upstream.status });
        }

        Ok(ProviderOutcome::Relayed {
            status: upstream.status,
            content_type: upstream
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            body: Bytes::from(upstream.text),
        })
    }
}
