// Generation handler: one entry point for every allowed proxy endpoint

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, Extension, State},
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use iris_types::{GenerationRequest, ProxyError, RuntimeConfig};

use super::common::error_response;
use crate::proxy::common::SecretScrubber;
use crate::proxy::mappers::normalize::build_response;
use crate::proxy::provider_router::{self, LogicalEndpoint};
use crate::proxy::providers::{adapter_for, ProviderCall, ProviderOutcome};
use crate::proxy::server::AppState;

pub async fn handle_generation(
    State(state): State<AppState>,
    Extension(endpoint): Extension<LogicalEndpoint>,
    Extension(config): Extension<Arc<RuntimeConfig>>,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let scrubber = SecretScrubber::from_config(&config);

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ProxyError::PayloadTooLarge
            } else {
                ProxyError::invalid_request("Invalid request body.")
            };
            tracing::warn!("[Generate] {} body rejected: {}", endpoint.path(), rejection.body_text());
            return error_response(&err, &scrubber);
        },
    };

    match generate(&state, endpoint, &config, &body, uri.query()).await {
        Ok(ProviderOutcome::Normalized(outputs)) => {
            tracing::info!("[Generate] {} returned {} output(s)", endpoint.path(), outputs.len());
            (StatusCode::OK, Json(build_response(outputs))).into_response()
        },
        Ok(ProviderOutcome::Relayed { status, content_type, body }) => {
            tracing::info!("[Generate] {} relayed upstream status {}", endpoint.path(), status);
            relayed_response(status, &content_type, body)
        },
        Err(err) => {
            let detail = scrubber.scrub(&err.to_string());
            if err.is_client_error() {
                tracing::warn!("[Generate] {} rejected: {}", endpoint.path(), detail);
            } else {
                tracing::error!("[Generate] {} failed: {}", endpoint.path(), detail);
            }
            error_response(&err, &scrubber)
        },
    }
}

async fn generate(
    state: &AppState,
    endpoint: LogicalEndpoint,
    config: &RuntimeConfig,
    body: &Bytes,
    query: Option<&str>,
) -> Result<ProviderOutcome, ProxyError> {
    let route = provider_router::resolve(endpoint, config)?;
    tracing::debug!("[Generate] {} routed to {}", endpoint.path(), route.provider_name());

    let request = GenerationRequest::from_body(body);
    let adapter = adapter_for(route, state.http_client.clone(), state.poll);
    adapter.execute(ProviderCall { request: &request, body, query }).await
}

fn relayed_response(status: u16, content_type: &str, body: Bytes) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/json"));
    (status, [(header::CONTENT_TYPE, content_type)], Body::from(body)).into_response()
}
