//! HTTP handlers for chat, health and catalogue endpoints.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::StreamExt;
use uuid::Uuid;

use crate::application::{ChatError, ChatOrchestrator, ChatOutcome};
use crate::domain::conversation::WorkflowStep;

use super::dto::{
    error_code, ChatRequest, ChatResponse, ErrorResponse, FrameworkListResponse,
    FrameworkSummary, HealthResponse, SequenceListResponse, SequenceSummary, StatusResponse,
};

pub const SERVICE_NAME: &str = "journey-builder";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for every route. The orchestrator is built once at startup.
#[derive(Clone)]
pub struct ChatAppState {
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl ChatAppState {
    pub fn new(orchestrator: Arc<ChatOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Chat
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/chat - Run one chat turn
pub async fn chat(
    State(state): State<ChatAppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return malformed_request(rejection),
    };

    let cmd = req.into_command(Some(request_id(&headers)));
    match state.orchestrator.process(cmd).await {
        Ok(outcome) => (StatusCode::OK, Json(ChatResponse::from(outcome))).into_response(),
        Err(err) => handle_chat_error(&err),
    }
}

/// POST /api/chat/stream - Same pipeline, answered as a single SSE event
pub async fn chat_stream(
    State(state): State<ChatAppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return malformed_request(rejection),
    };

    let cmd = req.into_command(Some(request_id(&headers)));
    let events = Arc::clone(&state.orchestrator)
        .process_stream(cmd)
        .map(|result| Ok::<_, Infallible>(to_event(result)));

    Sse::new(events).into_response()
}

fn to_event(result: Result<ChatOutcome, ChatError>) -> Event {
    let (name, body) = match result {
        Ok(outcome) => ("message", ChatResponse::from(outcome)),
        Err(err) => ("error", ChatResponse::from(&err)),
    };

    Event::default()
        .event(name)
        .json_data(body)
        .unwrap_or_else(|_| Event::default().event("error").data("{}"))
}

/// Request id set by the request-id layer, or a fresh one when the routes
/// are mounted without it.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn malformed_request(rejection: JsonRejection) -> Response {
    tracing::debug!(error = %rejection, "malformed chat request");
    (
        StatusCode::BAD_REQUEST,
        Json(
            ErrorResponse::bad_request("invalid request body")
                .with_details(serde_json::Value::String(rejection.body_text())),
        ),
    )
        .into_response()
}

fn handle_chat_error(err: &ChatError) -> Response {
    let status = match err {
        ChatError::InputRejected { .. } => StatusCode::BAD_REQUEST,
        ChatError::GatewayFailure(_) => StatusCode::BAD_GATEWAY,
    };
    tracing::debug!(code = error_code(err), status = status.as_u16(), "chat request failed");
    (status, Json(ChatResponse::from(err))).into_response()
}

// ════════════════════════════════════════════════════════════════════════════
// Health and catalogue
// ════════════════════════════════════════════════════════════════════════════

/// GET /health - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/v1/status - Service and knowledge summary
pub async fn status(State(state): State<ChatAppState>) -> Json<StatusResponse> {
    let resolver = state.orchestrator.resolver();
    let frameworks = resolver
        .list_frameworks()
        .iter()
        .map(|fw| fw.acronym.clone())
        .collect();

    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        workflow_steps: WorkflowStep::ALL.len(),
        frameworks,
        verticals: resolver.knowledge_base().vertical_count(),
        provider: state.orchestrator.provider_name(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /api/v1/frameworks - Framework catalogue, most relevant first
pub async fn list_frameworks(State(state): State<ChatAppState>) -> Json<FrameworkListResponse> {
    let frameworks = state
        .orchestrator
        .resolver()
        .list_frameworks()
        .iter()
        .map(|fw| FrameworkSummary::from(fw.as_ref()))
        .collect();

    Json(FrameworkListResponse { frameworks })
}

/// GET /api/v1/sequences/:vertical - Templates registered for a vertical
pub async fn list_sequences(
    State(state): State<ChatAppState>,
    Path(vertical): Path<String>,
) -> Json<SequenceListResponse> {
    let sequences = state
        .orchestrator
        .resolver()
        .sequences_for_vertical(&vertical)
        .iter()
        .map(|t| SequenceSummary::from(t.as_ref()))
        .collect();

    Json(SequenceListResponse {
        vertical,
        sequences,
    })
}
