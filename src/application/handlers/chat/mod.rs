//! Chat turn handling.
//!
//! `ChatOrchestrator` is the single entry point the transport invokes once
//! per chat request.

mod process_chat;
mod retry;

pub use process_chat::{
    ChatCommand, ChatError, ChatOrchestrator, ChatOutcome, ChatSettings, PreparedTurn,
    GATEWAY_FAILURE_MESSAGE,
};
pub use retry::RetryPolicy;
