// CORS headers for the proxy endpoints
use axum::http::{header, HeaderMap, HeaderValue};

const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const ALLOW_METHODS: &str = "POST, OPTIONS";

/// Echo the request `Origin` (or `*`) and advertise the accepted headers and methods.
pub fn apply_cors_headers(headers: &mut HeaderMap, origin: Option<&HeaderValue>) {
    let allow_origin = origin.cloned().unwrap_or_else(|| HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_echoed() {
        let mut headers = HeaderMap::new();
        let origin = HeaderValue::from_static("https://iris.example");
        apply_cors_headers(&mut headers, Some(&origin));
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://iris.example");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
    }

    #[test]
    fn test_wildcard_without_origin() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&mut headers, None);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Authorization");
    }
}
