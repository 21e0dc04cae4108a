//! Nano Banana: asynchronous generate-then-poll image provider.
//!
//! 1. `POST /api/v1/images/generate` returns a task id.
//! 2. `GET /api/v1/images/{task_id}` is polled every [`PollSettings::interval`]
//!    until the task succeeds, fails, or [`PollSettings::timeout`] elapses.
//! 3. Image URLs are collected from the final payload.
//!
//! The poll loop runs inside the request future, so a client disconnect drops
//! it along with the request.

use std::time::Duration;

use async_trait::async_trait;
use iris_types::{GenerationRequest, MediaKind, ProxyError};
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use url::Url;

use super::{join_url, network_error, ProviderAdapter, ProviderCall, ProviderOutcome};
use crate::proxy::common::upstream_body::UpstreamBody;
use crate::proxy::mappers::normalize::outputs_from_urls;
use crate::proxy::provider_router::Credential;

pub const PROVIDER: &str = "Nano Banana";
pub const DEFAULT_MODEL: &str = "nano-banana-pro";

const GENERATE_PATH: &str = "/api/v1/images/generate";
const STATUS_PATH: &str = "/api/v1/images/";

const SUCCESS_STATES: [&str; 3] = ["completed", "succeeded", "success"];
const FAILURE_STATES: [&str; 2] = ["failed", "error"];

/// Poll cadence and overall deadline for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self { interval: Duration::from_millis(1500), timeout: Duration::from_secs(45) }
    }
}

/// Output resolution requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    OneK,
    TwoK,
    FourK,
}

impl ResolutionTier {
    /// Tier from the larger requested dimension: `>=3500` 4K, `>=1700` 2K, else 1K.
    pub fn from_dimensions(width: Option<f64>, height: Option<f64>) -> Self {
        let max_dim = width.unwrap_or(0.0).max(height.unwrap_or(0.0));
        if max_dim >= 3500.0 {
            Self::FourK
        } else if max_dim >= 1700.0 {
            Self::TwoK
        } else {
            Self::OneK
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneK => "1K",
            Self::TwoK => "2K",
            Self::FourK => "4K",
        }
    }
}

#[derive(Debug, Serialize)]
struct GeneratePayload<'a> {
    model: &'a str,
    prompt: &'a str,
    aspect_ratio: &'a str,
    resolution: &'static str,
}

// ===== Upstream payload readers =====
//
// Every field is read on its own; a value of the wrong type counts as absent
// and never hides the fields next to it.

fn str_field<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// `data` when it is an object.
fn data_object(payload: &Value) -> Option<&Value> {
    payload.get("data").filter(|data| data.is_object())
}

/// `data.task_id`, then the root `task_id`; strings or integers.
fn task_id(payload: &Value) -> Option<String> {
    let read = |object: &Value| match object.get("task_id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    data_object(payload).and_then(read).or_else(|| read(payload))
}

#[derive(Debug, PartialEq, Eq)]
enum TaskState {
    Succeeded,
    Failed(String),
    Pending,
}

/// Status from `data.status`, then the root `status`.
fn task_state(payload: &Value) -> TaskState {
    let status = data_object(payload)
        .and_then(|data| str_field(data, "status"))
        .or_else(|| str_field(payload, "status"))
        .unwrap_or_default();

    if SUCCESS_STATES.contains(&status) {
        TaskState::Succeeded
    } else if FAILURE_STATES.contains(&status) {
        TaskState::Failed(failure_message(payload))
    } else {
        TaskState::Pending
    }
}

/// `error` as text or `{ message }`, read from `data` when present.
fn failure_message(payload: &Value) -> String {
    let fields = data_object(payload).unwrap_or(payload);
    fields
        .get("error")
        .and_then(|error| error.as_str().or_else(|| error.get("message").and_then(Value::as_str)))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} task failed.", PROVIDER))
}

/// Every URL in fixed order: per result `url` then `image_url`, then the
/// singular `image_url`, then `url`. Results that are not objects are skipped.
fn image_urls(payload: &Value) -> Vec<String> {
    let fields = data_object(payload).unwrap_or(payload);
    let mut urls = Vec::new();

    if let Some(results) = fields.get("results").and_then(Value::as_array) {
        for item in results.iter().filter(|item| item.is_object()) {
            urls.extend(str_field(item, "url").map(str::to_string));
            urls.extend(str_field(item, "image_url").map(str::to_string));
        }
    }
    urls.extend(str_field(fields, "image_url").map(str::to_string));
    urls.extend(str_field(fields, "url").map(str::to_string));
    urls
}

/// In-flight bookkeeping for one task; lives only inside the poll loop.
#[derive(Debug)]
struct PollState {
    task_id: String,
    deadline: Instant,
    last_payload: Value,
}

impl PollState {
    fn new(task_id: String, timeout: Duration) -> Self {
        Self { task_id, deadline: Instant::now() + timeout, last_payload: Value::Null }
    }

    fn record(&mut self, body: &UpstreamBody) {
        self.last_payload =
            body.json::<Value>().unwrap_or_else(|| Value::String(body.text.clone()));
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

pub struct NanoBananaAdapter {
    client: reqwest::Client,
    credential: Credential,
    poll: PollSettings,
}

impl NanoBananaAdapter {
    pub fn new(client: reqwest::Client, credential: Credential, poll: PollSettings) -> Self {
        Self { client, credential, poll }
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<String, ProxyError> {
        let resolution = ResolutionTier::from_dimensions(request.width, request.height);
        let payload = GeneratePayload {
            model: request.model.as_deref().unwrap_or(DEFAULT_MODEL),
            prompt: &request.prompt,
            aspect_ratio: request.aspect_ratio(),
            resolution: resolution.as_str(),
        };

        tracing::info!(
            "[NanoBanana] Submitting task: model={}, aspect_ratio={}, resolution={}",
            payload.model,
            payload.aspect_ratio,
            payload.resolution
        );

        let url = join_url(&self.credential.base_url, GENERATE_PATH)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.credential.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| network_error(PROVIDER, &e))?;
        let body = UpstreamBody::read(response, PROVIDER).await?;

        if !body.is_success() {
            return Err(ProxyError::UpstreamRejected {
                provider: PROVIDER.to_string(),
                upstream_status: body.status,
                message: body.error_message(),
            });
        }

        body.json::<Value>()
            .as_ref()
            .and_then(task_id)
            .ok_or_else(|| {
                ProxyError::upstream_failed(format!("{} response did not include a task_id.", PROVIDER))
            })
    }

    fn status_url(&self, task_id: &str) -> Result<Url, ProxyError> {
        let mut url = join_url(&self.credential.base_url, STATUS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| ProxyError::Internal {
                message: format!("{} base cannot carry a path", PROVIDER),
            })?
            .pop_if_empty()
            .push(task_id);
        Ok(url)
    }

    /// Poll until a terminal state or the deadline; returns the final payload.
    async fn poll(&self, task_id: String) -> Result<Value, ProxyError> {
        let url = self.status_url(&task_id)?;
        let mut state = PollState::new(task_id, self.poll.timeout);
        let mut attempts: u32 = 0;

        while !state.expired() {
            attempts += 1;
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(&self.credential.api_key)
                .send()
                .await
                .map_err(|e| network_error(PROVIDER, &e))?;
            let body = UpstreamBody::read(response, PROVIDER).await?;
            state.record(&body);

            if !body.is_success() {
                return Err(ProxyError::upstream_failed(format!(
                    "{} status error {}: {}",
                    PROVIDER,
                    body.status,
                    body.error_message()
                )));
            }

            match task_state(&state.last_payload) {
                TaskState::Succeeded => {
                    tracing::debug!(
                        "[NanoBanana] Task {} completed after {} poll(s)",
                        state.task_id,
                        attempts
                    );
                    return Ok(state.last_payload);
                },
                TaskState::Failed(message) => {
                    tracing::warn!("[NanoBanana] Task {} failed after {} poll(s)", state.task_id, attempts);
                    return Err(ProxyError::upstream_failed(message));
                },
                TaskState::Pending => {},
            }

            tokio::time::sleep(self.poll.interval).await;
        }

        tracing::warn!(
            "[NanoBanana] Task {} still pending after {} poll(s) ({:?})",
            state.task_id,
            attempts,
            self.poll.timeout
        );
        Err(ProxyError::PollTimeout {
            provider: PROVIDER.to_string(),
            task_id: state.task_id,
            last_payload: state.last_payload.to_string(),
        })
    }
}

#[async_trait]
impl ProviderAdapter for NanoBananaAdapter {
    async fn execute(&self, call: ProviderCall<'_>) -> Result<ProviderOutcome, ProxyError> {
        let task_id = self.submit(call.request).await?;
        tracing::info!("[NanoBanana] Task {} accepted, polling", task_id);

        let payload = self.poll(task_id).await?;
        let outputs = outputs_from_urls(MediaKind::Image, image_urls(&payload));

        if outputs.is_empty() {
            return Err(ProxyError::upstream_failed(format!(
                "{} completed without an image URL.",
                PROVIDER
            )));
        }
        Ok(ProviderOutcome::Normalized(outputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(value: Value) -> TaskState {
        task_state(&value)
    }

    fn urls(value: Value) -> Vec<String> {
        image_urls(&value)
    }

    #[test]
    fn test_resolution_tiers() {
        assert_eq!(ResolutionTier::from_dimensions(Some(4000.0), Some(1000.0)).as_str(), "4K");
        assert_eq!(ResolutionTier::from_dimensions(Some(1800.0), Some(100.0)).as_str(), "2K");
        assert_eq!(ResolutionTier::from_dimensions(Some(800.0), Some(800.0)).as_str(), "1K");
    }

    #[test]
    fn test_resolution_tier_boundaries() {
        assert_eq!(ResolutionTier::from_dimensions(Some(3500.0), None), ResolutionTier::FourK);
        assert_eq!(ResolutionTier::from_dimensions(None, Some(3499.0)), ResolutionTier::TwoK);
        assert_eq!(ResolutionTier::from_dimensions(Some(1700.0), None), ResolutionTier::TwoK);
        assert_eq!(ResolutionTier::from_dimensions(Some(1699.0), None), ResolutionTier::OneK);
        assert_eq!(ResolutionTier::from_dimensions(None, None), ResolutionTier::OneK);
    }

    #[test]
    fn test_task_id_locations() {
        assert_eq!(task_id(&json!({"data": {"task_id": "abc"}})).as_deref(), Some("abc"));
        assert_eq!(task_id(&json!({"task_id": 42})).as_deref(), Some("42"));
        assert_eq!(task_id(&json!({"data": {}, "task_id": ""})), None);
        assert_eq!(task_id(&json!({"data": "queued", "task_id": "root"})).as_deref(), Some("root"));
        assert_eq!(
            task_id(&json!({"data": {"task_id": ""}, "task_id": "root"})).as_deref(),
            Some("root")
        );
        assert_eq!(task_id(&json!({"task_id": {"id": 1}})), None);
    }

    #[test]
    fn test_status_vocabulary() {
        assert_eq!(status(json!({"data": {"status": "completed"}})), TaskState::Succeeded);
        assert_eq!(status(json!({"status": "succeeded"})), TaskState::Succeeded);
        assert_eq!(status(json!({"data": {"status": "success"}})), TaskState::Succeeded);
        assert_eq!(status(json!({"data": {"status": "processing"}})), TaskState::Pending);
        assert_eq!(status(json!({"queued": true})), TaskState::Pending);
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            status(json!({"data": {"status": "failed", "error": "NSFW prompt"}})),
            TaskState::Failed("NSFW prompt".to_string())
        );
        assert_eq!(
            status(json!({"status": "error", "error": {"message": "quota"}})),
            TaskState::Failed("quota".to_string())
        );
        assert_eq!(
            status(json!({"data": {"status": "failed"}})),
            TaskState::Failed("Nano Banana task failed.".to_string())
        );
    }

    #[test]
    fn test_data_status_wins_over_root() {
        assert_eq!(
            status(json!({"status": "failed", "data": {"status": "completed"}})),
            TaskState::Succeeded
        );
    }

    #[test]
    fn test_numeric_root_status_does_not_hide_data_status() {
        assert_eq!(
            status(json!({
                "code": 200,
                "status": 200,
                "data": {"status": "completed", "results": [{"url": "https://cdn/1.png"}]}
            })),
            TaskState::Succeeded
        );
        assert_eq!(status(json!({"status": 500, "data": {"status": 1}})), TaskState::Pending);
        assert_eq!(
            status(json!({"data": {"status": "failed", "error": 42}})),
            TaskState::Failed("Nano Banana task failed.".to_string())
        );
    }

    #[test]
    fn test_image_url_collection_order() {
        let collected = urls(json!({
            "data": {
                "status": "completed",
                "results": [
                    {"url": "https://cdn/1.png", "image_url": "https://cdn/1b.png"},
                    {"image_url": "https://cdn/2.png"},
                    {}
                ],
                "image_url": "https://cdn/3.png",
                "url": "https://cdn/4.png"
            }
        }));
        assert_eq!(
            collected,
            vec![
                "https://cdn/1.png",
                "https://cdn/1b.png",
                "https://cdn/2.png",
                "https://cdn/3.png",
                "https://cdn/4.png"
            ]
        );
    }

    #[test]
    fn test_image_urls_from_root_without_data() {
        assert_eq!(urls(json!({"status": "success", "url": "https://cdn/x.png"})), vec![
            "https://cdn/x.png"
        ]);
        assert!(urls(json!({"data": {"status": "completed"}})).is_empty());
    }

    #[test]
    fn test_malformed_results_are_skipped() {
        assert_eq!(
            urls(json!({
                "data": {
                    "status": "completed",
                    "results": [null, "https://cdn/raw.png", {"url": 7, "image_url": "https://cdn/1.png"}],
                    "image_url": "https://cdn/2.png"
                }
            })),
            vec!["https://cdn/1.png", "https://cdn/2.png"]
        );
        assert_eq!(
            urls(json!({"results": "none", "image_url": ["x"], "url": "https://cdn/3.png"})),
            vec!["https://cdn/3.png"]
        );
    }

    #[test]
    fn test_poll_state_records_raw_text() {
        let mut state = PollState::new("t".to_string(), Duration::from_secs(1));
        state.record(&UpstreamBody {
            status: 200,
            content_type: None,
            text: "not json".to_string(),
        });
        assert_eq!(state.last_payload.to_string(), "\"not json\"");
        assert!(!state.expired());
    }
}
