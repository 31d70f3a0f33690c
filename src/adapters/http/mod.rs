//! HTTP adapters - REST API implementations.

pub mod chat;
mod server;

pub use chat::{chat_routes, ChatAppState};
pub use server::build_app;
