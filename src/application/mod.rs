//! Application layer - Handlers.
//!
//! This layer sequences domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    ChatCommand, ChatError, ChatOrchestrator, ChatOutcome, ChatSettings, PreparedTurn, RetryPolicy,
    GATEWAY_FAILURE_MESSAGE,
};
