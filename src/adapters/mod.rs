//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Model gateway providers (Gemini, mock)
//! - `http` - Axum routes, DTOs and handlers

pub mod ai;
pub mod http;
