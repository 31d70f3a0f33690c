//! Application handlers.
//!
//! Handlers that orchestrate domain operations and the model gateway.

pub mod chat;

pub use chat::{
    ChatCommand, ChatError, ChatOrchestrator, ChatOutcome, ChatSettings, PreparedTurn, RetryPolicy,
    GATEWAY_FAILURE_MESSAGE,
};
