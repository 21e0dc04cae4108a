//! Origin/path guard for everything under `/api/`.
//!
//! Order: config reload, CORS headers, preflight, method, origin, endpoint.
//! The body ceiling is enforced by the handler's extractor. On success the
//! fresh config snapshot and the matched [`LogicalEndpoint`] are handed to the
//! handler as request extensions.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use iris_types::{ProxyError, RuntimeConfig};

use super::cors::apply_cors_headers;
use crate::modules::ConfigProvider;
use crate::proxy::common::SecretScrubber;
use crate::proxy::handlers::common::error_response;
use crate::proxy::provider_router::LogicalEndpoint;

pub async fn api_guard(
    State(config): State<Arc<ConfigProvider>>,
    mut request: Request,
    next: Next,
) -> Response {
    let snapshot = config.reload().await;
    let origin = request.headers().get(header::ORIGIN).cloned();

    let mut response = match check(&mut request, &snapshot) {
        Ok(Admission::Preflight) => StatusCode::NO_CONTENT.into_response(),
        Ok(Admission::Forward) => next.run(request).await,
        Err(err) => {
            tracing::warn!(
                "Guard rejected {} {}: {}",
                request.method(),
                request.uri().path(),
                err
            );
            error_response(&err, &SecretScrubber::default())
        },
    };

    apply_cors_headers(response.headers_mut(), origin.as_ref());
    response
}

enum Admission {
    Preflight,
    Forward,
}

fn check(request: &mut Request, snapshot: &Arc<RuntimeConfig>) -> Result<Admission, ProxyError> {
    if request.method() == Method::OPTIONS {
        return Ok(Admission::Preflight);
    }
    if request.method() != Method::POST {
        return Err(ProxyError::MethodNotAllowed);
    }

    let origin = request
        .headers()
        .get(header::ORIGIN)
        .map(|v| v.to_str().unwrap_or_default());
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()));
    if !origin_allowed(origin, host, &snapshot.allowed_origins()) {
        return Err(ProxyError::OriginNotAllowed);
    }

    let endpoint = LogicalEndpoint::from_request_path(request.uri().path())
        .ok_or(ProxyError::EndpointNotAllowed)?;

    request.extensions_mut().insert(endpoint);
    request.extensions_mut().insert(snapshot.clone());
    Ok(Admission::Forward)
}

/// An explicit allowlist requires a literal match; without one, a missing
/// `Origin` is accepted and a present one must name the request's own host.
pub fn origin_allowed(origin: Option<&str>, host: Option<&str>, allowlist: &[String]) -> bool {
    if !allowlist.is_empty() {
        return origin.is_some_and(|origin| allowlist.iter().any(|allowed| allowed == origin));
    }

    let Some(origin) = origin else {
        return true;
    };
    let Some(host) = host else {
        return false;
    };
    origin == format!("http://{}", host) || origin == format!("https://{}", host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(origins: &[&str]) -> Vec<String> {
        origins.iter().map(|o| o.to_string()).collect()
    }

    #[test]
    fn test_same_host_default() {
        assert!(origin_allowed(Some("https://example.com"), Some("example.com"), &[]));
        assert!(origin_allowed(Some("http://localhost:8080"), Some("localhost:8080"), &[]));
        assert!(!origin_allowed(Some("https://example.com"), Some("other.com"), &[]));
        assert!(!origin_allowed(Some("https://example.com"), None, &[]));
    }

    #[test]
    fn test_missing_origin_without_allowlist() {
        assert!(origin_allowed(None, Some("example.com"), &[]));
        assert!(origin_allowed(None, None, &[]));
    }

    #[test]
    fn test_explicit_allowlist_is_literal() {
        let allowlist = list(&["https://iris.example", "http://localhost:3000"]);
        assert!(origin_allowed(Some("https://iris.example"), Some("proxy.internal"), &allowlist));
        assert!(!origin_allowed(Some("https://iris.example/"), Some("proxy.internal"), &allowlist));
        assert!(!origin_allowed(Some("https://proxy.internal"), Some("proxy.internal"), &allowlist));
        assert!(!origin_allowed(None, Some("proxy.internal"), &allowlist));
    }
}
