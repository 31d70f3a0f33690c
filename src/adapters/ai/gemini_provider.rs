//! Gemini Provider - Implementation of AIProvider for Google's Generative Language API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_timeout(Duration::from_secs(120));
//!
//! let provider = GeminiProvider::new(config)?;
//! ```
//!
//! The provider issues exactly one `generateContent` call per `complete`.
//! Retries are the caller's concern.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Secret<String>,
    /// Model id, e.g. "gemini-2.5-flash".
    pub model: String,
    /// API root without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_secret(Secret::new(api_key.into()))
    }

    /// Builds a config around an already-wrapped key.
    pub fn from_secret(api_key: Secret<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini REST provider.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn timeout_secs(&self) -> u32 {
        self.config.timeout.as_secs() as u32
    }

    /// Converts our request to Gemini's wire format.
    fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .map(|msg| GeminiContent {
                role: match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Model => "model",
                }
                .to_string(),
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            })
            .collect();

        GeminiRequest {
            system_instruction: request.system_prompt.as_ref().map(|prompt| GeminiSystem {
                parts: vec![GeminiPart {
                    text: prompt.clone(),
                }],
            }),
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let body = Self::to_gemini_request(request);

        self.client
            .post(self.generate_url())
            .query(&[("key", self.config.api_key())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.timeout_secs(),
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e.without_url()))
                } else {
                    AIError::network(e.without_url().to_string())
                }
            })
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e.without_url())))?;

        Ok(into_completion(parsed, &self.config.model))
    }
}

/// Maps a non-success status and its body onto the error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> AIError {
    let lower = body.to_lowercase();

    match status.as_u16() {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(parse_retry_delay(body).unwrap_or(30)),
        500..=599 => AIError::unavailable(format!("{status}: {body}")),
        _ if lower.contains("overloaded") || lower.contains("unavailable") => {
            AIError::unavailable(format!("{status}: {body}"))
        }
        400 => AIError::InvalidRequest(body.to_string()),
        _ => AIError::network(format!("Unexpected status {status}: {body}")),
    }
}

/// Reads `"retryDelay": "17s"` out of a RetryInfo detail, if present.
fn parse_retry_delay(body: &str) -> Option<u32> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")?
        .get("details")?
        .as_array()?
        .iter()
        .filter_map(|detail| detail.get("retryDelay")?.as_str())
        .find_map(|delay| delay.trim_end_matches('s').parse::<f64>().ok())
        .map(|secs| secs.ceil() as u32)
}

fn into_completion(response: GeminiResponse, configured_model: &str) -> CompletionResponse {
    let candidate = response.candidates.into_iter().next();

    let (content, finish_reason) = match candidate {
        Some(candidate) => {
            let text = candidate
                .content
                .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
                .unwrap_or_default();
            let reason = match candidate.finish_reason.as_deref() {
                Some("STOP") | None => FinishReason::Stop,
                Some("MAX_TOKENS") => FinishReason::Length,
                Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") => {
                    FinishReason::ContentFilter
                }
                Some(_) => FinishReason::Other,
            };
            (text, reason)
        }
        None => (String::new(), FinishReason::Stop),
    };

    let usage = response
        .usage_metadata
        .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
        .unwrap_or_default();

    CompletionResponse {
        content,
        usage,
        model: response
            .model_version
            .unwrap_or_else(|| configured_model.to_string()),
        finish_reason,
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model)
    }
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystem>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiSystem {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ConversationMessage;

    #[test]
    fn config_builder_works() {
        let config = GeminiConfig::new("test-key")
            .with_model("gemini-2.0-pro")
            .with_base_url("https://proxy.internal/v1beta/")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.model, "gemini-2.0-pro");
        assert_eq!(config.base_url, "https://proxy.internal/v1beta");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let config = GeminiConfig::new("super-secret");
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn generate_url_names_model() {
        let provider = GeminiProvider::new(GeminiConfig::new("k")).unwrap();
        assert_eq!(
            provider.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    mod request_body {
        use super::*;

        #[test]
        fn carries_system_instruction_history_and_generation_config() {
            let history = vec![
                ConversationMessage::user("Hi"),
                ConversationMessage::model("Hello! What do you sell?"),
            ];
            let request = CompletionRequest::new()
                .with_history(&history)
                .with_message(MessageRole::User, "Protein bars")
                .with_system_prompt("You are Da Vinci")
                .with_temperature(0.7)
                .with_max_tokens(1500);

            let json = serde_json::to_value(GeminiProvider::to_gemini_request(&request)).unwrap();

            assert_eq!(json["systemInstruction"]["parts"][0]["text"], "You are Da Vinci");
            assert_eq!(json["contents"].as_array().unwrap().len(), 3);
            assert_eq!(json["contents"][1]["role"], "model");
            assert_eq!(json["contents"][2]["role"], "user");
            assert_eq!(json["contents"][2]["parts"][0]["text"], "Protein bars");
            assert_eq!(json["generationConfig"]["maxOutputTokens"], 1500);
            assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        }

        #[test]
        fn omits_absent_system_instruction() {
            let request = CompletionRequest::new().with_message(MessageRole::User, "Hi");
            let json = serde_json::to_value(GeminiProvider::to_gemini_request(&request)).unwrap();

            assert!(json.get("systemInstruction").is_none());
            assert!(json["generationConfig"].get("temperature").is_none());
        }
    }

    mod status_mapping {
        use super::*;

        #[test]
        fn too_many_requests_is_rate_limited() {
            let body = r#"{"error":{"code":429,"details":[{"@type":"type.googleapis.com/google.rpc.RetryInfo","retryDelay":"17s"}]}}"#;
            match classify_failure(StatusCode::TOO_MANY_REQUESTS, body) {
                AIError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 17),
                other => panic!("expected RateLimited, got {other:?}"),
            }
        }

        #[test]
        fn rate_limit_without_retry_info_defaults() {
            match classify_failure(StatusCode::TOO_MANY_REQUESTS, "quota") {
                AIError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 30),
                other => panic!("expected RateLimited, got {other:?}"),
            }
        }

        #[test]
        fn server_errors_are_unavailable_and_retryable() {
            let err = classify_failure(StatusCode::SERVICE_UNAVAILABLE, "The model is overloaded.");
            assert!(matches!(err, AIError::Unavailable { .. }));
            assert!(err.is_retryable());
        }

        #[test]
        fn overloaded_body_is_unavailable_regardless_of_status() {
            let err = classify_failure(StatusCode::CONFLICT, "model UNAVAILABLE right now");
            assert!(matches!(err, AIError::Unavailable { .. }));
        }

        #[test]
        fn auth_failures_are_not_retryable() {
            for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
                let err = classify_failure(status, "API key not valid");
                assert!(matches!(err, AIError::AuthenticationFailed));
                assert!(!err.is_retryable());
            }
        }

        #[test]
        fn bad_request_is_invalid_request() {
            let err = classify_failure(StatusCode::BAD_REQUEST, "contents is empty");
            assert!(matches!(err, AIError::InvalidRequest(_)));
        }
    }

    mod response_parsing {
        use super::*;

        fn parse(json: &str) -> CompletionResponse {
            into_completion(serde_json::from_str(json).unwrap(), "gemini-2.5-flash")
        }

        #[test]
        fn joins_candidate_parts() {
            let response = parse(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"there"}]},"finishReason":"STOP"}],
                    "usageMetadata":{"promptTokenCount":12,"candidatesTokenCount":3},
                    "modelVersion":"gemini-2.5-flash-001"}"#,
            );

            assert_eq!(response.content, "Hello there");
            assert_eq!(response.finish_reason, FinishReason::Stop);
            assert_eq!(response.usage.total_tokens, 15);
            assert_eq!(response.model, "gemini-2.5-flash-001");
        }

        #[test]
        fn empty_candidates_yield_empty_text() {
            let response = parse(r#"{"candidates":[]}"#);
            assert_eq!(response.content, "");
            assert_eq!(response.model, "gemini-2.5-flash");
        }

        #[test]
        fn max_tokens_maps_to_length() {
            let response = parse(
                r#"{"candidates":[{"content":{"parts":[{"text":"cut"}]},"finishReason":"MAX_TOKENS"}]}"#,
            );
            assert_eq!(response.finish_reason, FinishReason::Length);
        }

        #[test]
        fn safety_block_maps_to_content_filter() {
            let response = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
            assert_eq!(response.content, "");
            assert_eq!(response.finish_reason, FinishReason::ContentFilter);
        }
    }
}
