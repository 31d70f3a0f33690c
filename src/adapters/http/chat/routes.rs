//! HTTP routes for chat, health and catalogue endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    chat, chat_stream, health, list_frameworks, list_sequences, status, ChatAppState,
};

/// Creates the router with every public endpoint.
///
/// Chat endpoints are served both unversioned and under `/api/v1`.
pub fn chat_routes(state: ChatAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/v1/chat", post(chat))
        .route("/api/chat/stream", post(chat_stream))
        .route("/api/v1/chat/stream", post(chat_stream))
        .route("/api/v1/status", get(status))
        .route("/api/v1/frameworks", get(list_frameworks))
        .route("/api/v1/sequences/:vertical", get(list_sequences))
        .with_state(state)
}
