//! Port interfaces (traits) for external dependencies.
//!
//! The domain and application layers depend on these abstractions; adapters
//! provide the implementations.

mod ai_provider;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, TokenUsage,
};
