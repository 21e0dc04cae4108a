//! Proxy-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while guarding, routing, or relaying a generation request.
///
/// The `Display` text of every variant except [`ProxyError::Internal`] is what the
/// client sees in the `error` field, after secret scrubbing.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ProxyError {
    /// Proxy endpoints only accept POST (and OPTIONS preflight)
    #[error("Method not allowed.")]
    MethodNotAllowed,

    /// Request Origin failed the allowlist or same-host check
    #[error("Origin not allowed.")]
    OriginNotAllowed,

    /// Logical endpoint is not one of the supported generation endpoints
    #[error("Endpoint not allowed.")]
    EndpointNotAllowed,

    /// Request body exceeded the configured ceiling
    #[error("Payload too large.")]
    PayloadTooLarge,

    /// Request validation failed
    #[error("{message}")]
    InvalidRequest { message: String },

    /// Credential pair for the resolved provider family is incomplete
    #[error("Missing {base_key} or {api_key} environment variables.")]
    MissingCredentials { base_key: String, api_key: String },

    /// Single required key is absent
    #[error("Missing {key} environment variable.")]
    MissingKey { key: String },

    /// Upstream answered with a non-2xx status
    #[error("{provider} error {upstream_status}: {message}")]
    UpstreamRejected {
        provider: String,
        upstream_status: u16,
        message: String,
    },

    /// Upstream answered 2xx but the payload is unusable (missing task id, no images, task failed)
    #[error("{message}")]
    UpstreamFailed { message: String },

    /// Upstream served an HTML page where JSON was expected
    #[error(
        "API returned an unexpected HTML response ({upstream_status}). The endpoint may be unavailable."
    )]
    UnexpectedHtml { upstream_status: u16 },

    /// Task never reached a terminal state before the poll deadline
    #[error("{provider} task {task_id} is still processing. Last response: {last_payload}")]
    PollTimeout {
        provider: String,
        task_id: String,
        last_payload: String,
    },

    /// Transport-level failure talking to the upstream
    #[error("{provider} request failed: {message}")]
    Network { provider: String, message: String },

    /// Internal proxy error (bugs, unexpected states); details stay in the logs
    #[error("Internal proxy error: {message}")]
    Internal { message: String },
}

impl ProxyError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    pub fn upstream_failed(message: impl Into<String>) -> Self {
        Self::UpstreamFailed { message: message.into() }
    }

    /// Check if this error was caused by the client request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MethodNotAllowed
                | Self::OriginNotAllowed
                | Self::EndpointNotAllowed
                | Self::PayloadTooLarge
                | Self::InvalidRequest { .. }
        )
    }

    /// Get HTTP status code for this error.
    ///
    /// Upstream auth failures (401/403) pass through; every other upstream
    /// failure is a 502.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MethodNotAllowed => 405,
            Self::OriginNotAllowed | Self::EndpointNotAllowed => 403,
            Self::PayloadTooLarge => 413,
            Self::InvalidRequest { .. } => 400,
            Self::MissingCredentials { .. } | Self::MissingKey { .. } | Self::Internal { .. } => {
                500
            },
            Self::UpstreamRejected { upstream_status, .. } => match upstream_status {
                401 | 403 => *upstream_status,
                _ => 502,
            },
            Self::UnexpectedHtml { upstream_status } => {
                if (200..300).contains(upstream_status) || !(100..600).contains(upstream_status) {
                    502
                } else {
                    *upstream_status
                }
            },
            Self::UpstreamFailed { .. } | Self::PollTimeout { .. } | Self::Network { .. } => 502,
        }
    }

    /// Message placed in the client-facing `error` field (before scrubbing).
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal { .. } => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16) -> ProxyError {
        ProxyError::UpstreamRejected {
            provider: "Nano Banana".to_string(),
            upstream_status: status,
            message: "nope".to_string(),
        }
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(ProxyError::MethodNotAllowed.http_status_code(), 405);
        assert_eq!(ProxyError::OriginNotAllowed.http_status_code(), 403);
        assert_eq!(ProxyError::EndpointNotAllowed.http_status_code(), 403);
        assert_eq!(ProxyError::PayloadTooLarge.http_status_code(), 413);
        assert_eq!(ProxyError::invalid_request("Prompt is required.").http_status_code(), 400);
        assert_eq!(
            ProxyError::MissingKey { key: "GOOGLE_API_KEY".to_string() }.http_status_code(),
            500
        );
    }

    #[test]
    fn test_upstream_auth_passthrough() {
        assert_eq!(rejected(401).http_status_code(), 401);
        assert_eq!(rejected(403).http_status_code(), 403);
        assert_eq!(rejected(429).http_status_code(), 502);
        assert_eq!(rejected(500).http_status_code(), 502);
    }

    #[test]
    fn test_unexpected_html_status() {
        assert_eq!(ProxyError::UnexpectedHtml { upstream_status: 200 }.http_status_code(), 502);
        assert_eq!(ProxyError::UnexpectedHtml { upstream_status: 404 }.http_status_code(), 404);
        assert_eq!(ProxyError::UnexpectedHtml { upstream_status: 503 }.http_status_code(), 503);
    }

    #[test]
    fn test_missing_credentials_names_both_keys() {
        let err = ProxyError::MissingCredentials {
            base_key: "NANO_BANANA_API_BASE".to_string(),
            api_key: "A2E_API_KEY".to_string(),
        };
        assert_eq!(
            err.client_message(),
            "Missing NANO_BANANA_API_BASE or A2E_API_KEY environment variables."
        );
    }

    #[test]
    fn test_internal_message_is_opaque() {
        let err = ProxyError::Internal { message: "join error at src/lib.rs".to_string() };
        assert_eq!(err.client_message(), "Server error");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_poll_timeout_carries_last_payload() {
        let err = ProxyError::PollTimeout {
            provider: "Nano Banana".to_string(),
            task_id: "t-1".to_string(),
            last_payload: r#"{"status":"processing"}"#.to_string(),
        };
        let msg = err.client_message();
        assert!(msg.contains("t-1"));
        assert!(msg.contains("processing"));
        assert_eq!(err.http_status_code(), 502);
    }
}
