//! HTTP adapter for chat endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    error_code, ChatRequest, ChatResponse, ErrorResponse, FrameworkListResponse,
    FrameworkSummary, HealthResponse, SequenceListResponse, SequenceSummary, StatusResponse,
};
pub use handlers::{ChatAppState, REQUEST_ID_HEADER, SERVICE_NAME};
pub use routes::chat_routes;
