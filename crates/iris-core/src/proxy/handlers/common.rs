use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use iris_types::{ErrorBody, ProxyError};

use crate::proxy::common::SecretScrubber;

/// `{ "error": ... }` with the status the error maps to; message text is scrubbed.
pub fn error_response(err: &ProxyError, scrubber: &SecretScrubber) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = scrubber.scrub(&err.client_message());
    let mut response = (status, Json(ErrorBody::new(message))).into_response();

    if matches!(err, ProxyError::MethodNotAllowed) {
        response.headers_mut().insert(header::ALLOW, HeaderValue::from_static("POST"));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_allowed_advertises_post() {
        let response = error_response(&ProxyError::MethodNotAllowed, &SecretScrubber::default());
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).and_then(|v| v.to_str().ok()), Some("POST"));
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ProxyError::Internal { message: "pool poisoned".to_string() };
        let response = error_response(&err, &SecretScrubber::default());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
