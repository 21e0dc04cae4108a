//! Buffered upstream responses and the error envelope providers share.

use iris_types::ProxyError;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// An upstream response read to completion.
#[derive(Debug, Clone)]
pub struct UpstreamBody {
    pub status: u16,
    pub content_type: Option<String>,
    pub text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl UpstreamBody {
    pub async fn read(response: reqwest::Response, provider: &str) -> Result<Self, ProxyError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.map_err(|e| ProxyError::Network {
            provider: provider.to_string(),
            message: format!("failed to read response body: {}", e),
        })?;
        Ok(Self { status, content_type, text })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as `T`; `None` when it is empty or does not match.
    pub fn json<T: DeserializeOwned>(&self) -> Option<T> {
        if self.text.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.text).ok()
    }

    /// `error.message` when the body carries one, else the raw body, else the
    /// canonical reason phrase.
    pub fn error_message(&self) -> String {
        if let Some(message) = self
            .json::<ErrorEnvelope>()
            .and_then(|envelope| envelope.error.message)
            .filter(|m| !m.is_empty())
        {
            return message;
        }
        if !self.text.is_empty() {
            return self.text.clone();
        }
        reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown status")
            .to_string()
    }

    /// The upstream served an HTML document instead of JSON.
    pub fn looks_like_html(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| ct.contains("text/html"))
            || self.text.trim_start().starts_with("<!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(status: u16, content_type: Option<&str>, text: &str) -> UpstreamBody {
        UpstreamBody {
            status,
            content_type: content_type.map(str::to_string),
            text: text.to_string(),
        }
    }

    #[test]
    fn error_message_prefers_structured_message() {
        let b = body(400, None, r#"{"error":{"message":"bad prompt","code":400}}"#);
        assert_eq!(b.error_message(), "bad prompt");
    }

    #[test]
    fn error_message_falls_back_to_text_then_reason() {
        assert_eq!(body(500, None, r#"{"error":"flat"}"#).error_message(), r#"{"error":"flat"}"#);
        assert_eq!(body(503, None, "").error_message(), "Service Unavailable");
    }

    #[test]
    fn html_detection() {
        assert!(body(200, Some("text/html; charset=utf-8"), "{}").looks_like_html());
        assert!(body(502, Some("application/json"), "  <!DOCTYPE html>").looks_like_html());
        assert!(!body(200, Some("application/json"), r#"{"ok":true}"#).looks_like_html());
        assert!(!body(200, None, "<html>").looks_like_html());
    }
}
