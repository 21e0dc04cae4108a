//! Client-facing generation request and normalized response shapes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Kind of media a generation produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// A single client ask, decoded leniently from the request body.
///
/// Field fallbacks: `prompt` then `text`; `aspect_ratio` then `aspectRatio`,
/// then the same two under `output`; `width`/`height` top-level then under
/// `output`. Numbers may arrive as JSON numbers or numeric strings. Fields this
/// type does not know about are kept in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub mode: Option<MediaKind>,
    pub model: Option<String>,
    pub prompt: String,
    pub aspect_ratio: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub count: Option<f64>,
    pub extra: Map<String, Value>,
}

impl GenerationRequest {
    pub const DEFAULT_ASPECT_RATIO: &'static str = "1:1";

    /// Decode a request body. Anything that is not a JSON object yields the
    /// all-defaults request.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice::<RawGenerationRequest>(body)
            .map(Self::from)
            .unwrap_or_default()
    }

    pub fn aspect_ratio(&self) -> &str {
        self.aspect_ratio.as_deref().unwrap_or(Self::DEFAULT_ASPECT_RATIO)
    }

    pub fn has_prompt(&self) -> bool {
        !self.prompt.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawGenerationRequest {
    #[serde(default, deserialize_with = "lenient_kind")]
    mode: Option<MediaKind>,
    #[serde(default, deserialize_with = "lenient_string")]
    model: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    aspect_ratio: Option<String>,
    #[serde(default, rename = "aspectRatio", deserialize_with = "lenient_string")]
    aspect_ratio_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_output")]
    output: Option<RawOutput>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOutput {
    #[serde(default, deserialize_with = "lenient_string")]
    aspect_ratio: Option<String>,
    #[serde(default, rename = "aspectRatio", deserialize_with = "lenient_string")]
    aspect_ratio_camel: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    height: Option<f64>,
}

impl From<RawGenerationRequest> for GenerationRequest {
    fn from(raw: RawGenerationRequest) -> Self {
        let output = raw.output.unwrap_or_default();
        Self {
            mode: raw.mode,
            model: raw.model,
            prompt: raw.prompt.or(raw.text).unwrap_or_default(),
            aspect_ratio: raw
                .aspect_ratio
                .or(raw.aspect_ratio_camel)
                .or(output.aspect_ratio)
                .or(output.aspect_ratio_camel),
            width: raw.width.or(output.width),
            height: raw.height.or(output.height),
            count: raw.count,
            extra: raw.extra,
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    // Zero and NaN count as absent.
    Ok(number.filter(|n| n.is_finite() && *n != 0.0))
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<Option<MediaKind>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.as_deref().and_then(MediaKind::parse))
}

fn lenient_output<'de, D>(deserializer: D) -> Result<Option<RawOutput>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// One generated asset. `kind` stays in-process; the wire shape is `{ "url": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedOutput {
    #[serde(skip)]
    pub kind: MediaKind,
    pub url: String,
}

impl NormalizedOutput {
    pub fn image(url: impl Into<String>) -> Self {
        Self { kind: MediaKind::Image, url: url.into() }
    }
}

/// Success body: `{ "data": [ { "url": ... }, ... ] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub data: Vec<NormalizedOutput>,
}

/// Failure body: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> GenerationRequest {
        GenerationRequest::from_body(value.to_string().as_bytes())
    }

    #[test]
    fn test_prompt_falls_back_to_text() {
        assert_eq!(decode(json!({"text": "a dog"})).prompt, "a dog");
        assert_eq!(decode(json!({"prompt": "a cat", "text": "a dog"})).prompt, "a cat");
        assert_eq!(decode(json!({"prompt": "", "text": "a dog"})).prompt, "a dog");
    }

    #[test]
    fn test_aspect_ratio_fallback_order() {
        assert_eq!(decode(json!({})).aspect_ratio(), "1:1");
        assert_eq!(decode(json!({"aspectRatio": "16:9"})).aspect_ratio(), "16:9");
        assert_eq!(
            decode(json!({"aspect_ratio": "4:5", "aspectRatio": "16:9"})).aspect_ratio(),
            "4:5"
        );
        assert_eq!(decode(json!({"output": {"aspectRatio": "9:16"}})).aspect_ratio(), "9:16");
        assert_eq!(
            decode(json!({"output": {"aspect_ratio": "3:4", "aspectRatio": "9:16"}}))
                .aspect_ratio(),
            "3:4"
        );
    }

    #[test]
    fn test_dimensions_accept_numeric_strings() {
        let request = decode(json!({"width": "1800", "output": {"height": 900}}));
        assert_eq!(request.width, Some(1800.0));
        assert_eq!(request.height, Some(900.0));

        let request = decode(json!({"width": "wide", "height": null}));
        assert_eq!(request.width, None);
        assert_eq!(request.height, None);
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let request = decode(json!({"prompt": "x", "seed": 42, "negative_prompt": "blur"}));
        assert_eq!(request.extra.get("seed"), Some(&json!(42)));
        assert_eq!(request.extra.get("negative_prompt"), Some(&json!("blur")));
    }

    #[test]
    fn test_mode_is_lenient() {
        assert_eq!(decode(json!({"mode": "Video"})).mode, Some(MediaKind::Video));
        assert_eq!(decode(json!({"mode": "audio"})).mode, None);
        assert_eq!(decode(json!({"mode": 3})).mode, None);
    }

    #[test]
    fn test_invalid_body_decodes_as_default() {
        assert_eq!(GenerationRequest::from_body(b"not json"), GenerationRequest::default());
        assert_eq!(GenerationRequest::from_body(b"[1,2]"), GenerationRequest::default());
        assert_eq!(GenerationRequest::from_body(b""), GenerationRequest::default());
    }

    #[test]
    fn test_response_wire_shape_omits_kind() {
        let body = GenerationResponse {
            data: vec![NormalizedOutput::image("https://cdn.example/a.png")],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap_or_default(),
            json!({"data": [{"url": "https://cdn.example/a.png"}]})
        );
    }
}
