//! Scripted model gateway for tests.
//!
//! Responses are queued and consumed in order; once the queue runs dry every
//! call answers with a fixed default. Every request is recorded so tests can
//! inspect the composed system prompt and the forwarded turns.
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_error(MockError::Overloaded)
//!     .with_response("Hi, I'm Da Vinci.");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Text returned once the scripted queue is exhausted.
pub const DEFAULT_MOCK_REPLY: &str = "Mock response";

#[derive(Debug, Clone)]
pub struct MockAIProvider {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

#[derive(Debug, Clone)]
pub enum MockResponse {
    Success { content: String, usage: TokenUsage },
    Error(MockError),
}

/// Failure modes a test can inject.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited,
    Overloaded,
    AuthenticationFailed,
    ContentFiltered { reason: String },
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited => AIError::rate_limited(1),
            MockError::Overloaded => AIError::unavailable("503: the model is overloaded"),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful reply.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.queue().push_back(MockResponse::Success {
            content: content.into(),
            usage: TokenUsage::new(10, 20),
        });
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: MockError) -> Self {
        self.queue().push_back(MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.recorded().len()
    }

    /// Returns all recorded requests.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.recorded().clone()
    }

    /// The most recent request, if any.
    pub fn last_call(&self) -> Option<CompletionRequest> {
        self.recorded().last().cloned()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<MockResponse>> {
        self.responses.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<CompletionRequest>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_response(&self) -> MockResponse {
        self.queue()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: DEFAULT_MOCK_REPLY.to_string(),
                usage: TokenUsage::new(5, 10),
            })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        self.recorded().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success { content, usage } => Ok(CompletionResponse {
                content,
                usage,
                model: self.info.model.clone(),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MessageRole;

    fn request() -> CompletionRequest {
        CompletionRequest::new().with_message(MessageRole::User, "Hello")
    }

    #[tokio::test]
    async fn returns_queued_responses_in_order() {
        let provider = MockAIProvider::new()
            .with_response("first")
            .with_response("second");

        assert_eq!(provider.complete(request()).await.unwrap().content, "first");
        assert_eq!(provider.complete(request()).await.unwrap().content, "second");
    }

    #[tokio::test]
    async fn falls_back_to_default_reply() {
        let provider = MockAIProvider::new();
        let response = provider.complete(request()).await.unwrap();
        assert_eq!(response.content, DEFAULT_MOCK_REPLY);
        assert_eq!(response.model, "mock-model-1");
    }

    #[tokio::test]
    async fn injected_errors_keep_their_retry_class() {
        let provider = MockAIProvider::new()
            .with_error(MockError::Overloaded)
            .with_error(MockError::AuthenticationFailed);

        assert!(provider.complete(request()).await.unwrap_err().is_retryable());
        assert!(!provider.complete(request()).await.unwrap_err().is_retryable());
    }

    #[tokio::test]
    async fn records_every_call() {
        let provider = MockAIProvider::new();
        provider
            .complete(request().with_system_prompt("layered prompt"))
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 1);
        let last = provider.last_call().unwrap();
        assert_eq!(last.system_prompt.as_deref(), Some("layered prompt"));
    }

    #[tokio::test(start_paused = true)]
    async fn honours_configured_delay() {
        let provider = MockAIProvider::new().with_delay(Duration::from_secs(5));
        let start = tokio::time::Instant::now();
        provider.complete(request()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
