//! Assembly of the common success shape shared by every adapter.

use iris_types::{GenerationResponse, MediaKind, NormalizedOutput};

const DEFAULT_INLINE_MIME: &str = "image/png";

/// Turn collected URLs into outputs of one kind, dropping empty entries.
pub fn outputs_from_urls<I>(kind: MediaKind, urls: I) -> Vec<NormalizedOutput>
where
    I: IntoIterator<Item = String>,
{
    urls.into_iter()
        .filter(|url| !url.trim().is_empty())
        .map(|url| NormalizedOutput { kind, url })
        .collect()
}

/// `data:<mime>;base64,<payload>`, defaulting the MIME type to PNG.
pub fn data_url(mime_type: Option<&str>, base64_payload: &str) -> String {
    let mime_type = mime_type.filter(|m| !m.is_empty()).unwrap_or(DEFAULT_INLINE_MIME);
    format!("data:{};base64,{}", mime_type, base64_payload)
}

pub fn build_response(outputs: Vec<NormalizedOutput>) -> GenerationResponse {
    GenerationResponse { data: outputs }
}
