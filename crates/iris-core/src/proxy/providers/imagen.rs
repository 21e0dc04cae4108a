//! Google Imagen via the Generative Language `:predict` endpoint.

use async_trait::async_trait;
use iris_types::{GenerationRequest, MediaKind, NormalizedOutput, ProxyError};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::{join_url, network_error, ProviderAdapter, ProviderCall, ProviderOutcome};
use crate::proxy::common::upstream_body::UpstreamBody;
use crate::proxy::mappers::normalize::data_url;
use crate::proxy::provider_router::Credential;

pub const PROVIDER: &str = "Gemini API";
pub const MODEL: &str = "imagen-4.0-generate-001";

const SUPPORTED_ASPECT_RATIOS: [&str; 5] = ["1:1", "3:4", "4:3", "9:16", "16:9"];
const MIN_SAMPLES: u8 = 1;
const MAX_SAMPLES: u8 = 4;

/// Closest aspect ratio Imagen accepts; unknown ratios become square.
pub fn map_aspect_ratio(ratio: &str) -> &'static str {
    if let Some(supported) = SUPPORTED_ASPECT_RATIOS.iter().find(|r| **r == ratio) {
        return supported;
    }
    match ratio {
        "4:5" | "2:3" => "3:4",
        "5:4" | "3:2" => "4:3",
        _ => "1:1",
    }
}

/// Requested sample count clamped to what one predict call returns.
pub fn sample_count(requested: Option<f64>) -> u8 {
    let requested = requested.unwrap_or(f64::from(MIN_SAMPLES));
    requested.clamp(f64::from(MIN_SAMPLES), f64::from(MAX_SAMPLES)) as u8
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest<'a> {
    instances: [Instance<'a>; 1],
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u8,
    aspect_ratio: &'static str,
    safety_filter_level: &'static str,
    person_generation: &'static str,
}

impl<'a> PredictRequest<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            instances: [Instance { prompt: &request.prompt }],
            parameters: Parameters {
                sample_count: sample_count(request.count),
                aspect_ratio: map_aspect_ratio(request.aspect_ratio()),
                safety_filter_level: "BLOCK_ONLY_HIGH",
                person_generation: "ALLOW_ALL",
            },
        }
    }
}

/// Data URLs for every prediction carrying inline bytes; malformed entries
/// are skipped one by one.
fn outputs_from_predictions(payload: &Value) -> Vec<NormalizedOutput> {
    let Some(predictions) = payload.get("predictions").and_then(Value::as_array) else {
        return Vec::new();
    };
    predictions
        .iter()
        .filter_map(|prediction| {
            let bytes = prediction
                .get("bytesBase64Encoded")
                .and_then(Value::as_str)
                .filter(|b| !b.is_empty())?;
            let mime_type = prediction.get("mimeType").and_then(Value::as_str);
            Some(NormalizedOutput { kind: MediaKind::Image, url: data_url(mime_type, bytes) })
        })
        .collect()
}

pub struct ImagenAdapter {
    client: reqwest::Client,
    credential: Credential,
}

impl ImagenAdapter {
    pub fn new(client: reqwest::Client, credential: Credential) -> Self {
        Self { client, credential }
    }

    fn predict_url(&self) -> Result<Url, ProxyError> {
        let mut url =
            join_url(&self.credential.base_url, &format!("/v1beta/models/{}:predict", MODEL))?;
        url.query_pairs_mut().append_pair("key", &self.credential.api_key);
        Ok(url)
    }
}

#[async_trait]
impl ProviderAdapter for ImagenAdapter {
    async fn execute(&self, call: ProviderCall<'_>) -> Result<ProviderOutcome, ProxyError> {
        if !call.request.has_prompt() {
            return Err(ProxyError::invalid_request("Prompt is required."));
        }

        let payload = PredictRequest::from_request(call.request);
        tracing::info!(
            "[Imagen] Predict: model={}, samples={}, aspect_ratio={}",
            MODEL,
            payload.parameters.sample_count,
            payload.parameters.aspect_ratio
        );

        let response = self
            .client
            .post(self.predict_url()?)
            .json(&payload)
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, &e.without_url()))?;
        let body = UpstreamBody::read(response, PROVIDER).await?;

        if !body.is_success() {
            return Err(ProxyError::UpstreamRejected {
                provider: PROVIDER.to_string(),
                upstream_status: body.status,
                message: body.error_message(),
            });
        }

        let outputs =
            body.json::<Value>().as_ref().map(outputs_from_predictions).unwrap_or_default();
        if outputs.is_empty() {
            return Err(ProxyError::upstream_failed(format!("{} returned no images.", PROVIDER)));
        }
        Ok(ProviderOutcome::Normalized(outputs))
    }
}
