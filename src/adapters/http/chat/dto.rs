//! HTTP DTOs for chat endpoints.
//!
//! These types decouple the wire format from domain types. Field names are
//! camelCase on the wire and optional fields are omitted, never null.

use serde::{Deserialize, Serialize};

use crate::application::{ChatCommand, ChatError, ChatOutcome};
use crate::domain::conversation::ConversationMessage;
use crate::domain::knowledge::{Framework, SequenceTemplate};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One chat turn. The client always sends the full history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub current_message: String,
    #[serde(default)]
    pub conversation_history: Vec<ConversationMessage>,
    #[serde(default)]
    pub base_system_prompt: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ChatRequest {
    pub fn into_command(self, request_id: Option<String>) -> ChatCommand {
        ChatCommand {
            current_message: self.current_message,
            history: self.conversation_history,
            base_system_prompt: self.base_system_prompt,
            user_metadata: self.user_metadata,
            request_id,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub workflow_step: u8,
    #[serde(rename = "extractedUSP", skip_serializing_if = "Option::is_none")]
    pub extracted_usp: Option<String>,
    #[serde(rename = "extractedICP", skip_serializing_if = "Option::is_none")]
    pub extracted_icp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identified_vertical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_circle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ChatOutcome> for ChatResponse {
    fn from(outcome: ChatOutcome) -> Self {
        let context = &outcome.context;
        Self {
            workflow_step: outcome.step.ordinal(),
            extracted_usp: context.usp().map(str::to_string),
            extracted_icp: context.icp().map(str::to_string),
            identified_vertical: context.vertical().map(|v| v.as_str().to_string()),
            current_circle: context.trust_tier().map(|t| t.as_str().to_string()),
            proposed_outcome: context.proposed_outcome().map(str::to_string),
            error: None,
            message: outcome.message,
        }
    }
}

impl From<&ChatError> for ChatResponse {
    fn from(err: &ChatError) -> Self {
        Self {
            message: err.public_message().to_string(),
            workflow_step: 0,
            extracted_usp: None,
            extracted_icp: None,
            identified_vertical: None,
            current_circle: None,
            proposed_outcome: None,
            error: Some(error_code(err).to_string()),
        }
    }
}

/// Stable machine-readable code for a chat failure.
pub fn error_code(err: &ChatError) -> &'static str {
    match err {
        ChatError::InputRejected { .. } => "input_rejected",
        ChatError::GatewayFailure(_) => "gateway_failure",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub workflow_steps: usize,
    pub frameworks: Vec<String>,
    pub verticals: usize,
    pub provider: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkSummary {
    pub acronym: String,
    pub name: String,
    pub best_for: Vec<String>,
    pub tone: String,
    pub funnel_stage: String,
    pub relevance_score: f64,
}

impl From<&Framework> for FrameworkSummary {
    fn from(fw: &Framework) -> Self {
        Self {
            acronym: fw.acronym.clone(),
            name: fw.name.clone(),
            best_for: fw.best_for.clone(),
            tone: fw.tone.clone(),
            funnel_stage: fw.funnel_stage.clone(),
            relevance_score: fw.relevance_score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameworkListResponse {
    pub frameworks: Vec<FrameworkSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSummary {
    pub outcome: String,
    pub vertical: String,
    pub duration: String,
    pub touch_points: u32,
    pub cadence: String,
    pub frameworks: Vec<String>,
    pub key_messages: Vec<String>,
}

impl From<&SequenceTemplate> for SequenceSummary {
    fn from(t: &SequenceTemplate) -> Self {
        Self {
            outcome: t.outcome.clone(),
            vertical: t.vertical.clone(),
            duration: t.duration.clone(),
            touch_points: t.touch_point_count,
            cadence: t.cadence.clone(),
            frameworks: t.frameworks.clone(),
            key_messages: t.key_messages.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SequenceListResponse {
    pub vertical: String,
    pub sequences: Vec<SequenceSummary>,
}

/// Error payload for failures outside the chat pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{ExtractedContext, MessageRole, TrustTier, WorkflowStep};
    use crate::domain::validation::InputRejection;
    use crate::ports::AIError;
    use serde_json::json;

    #[test]
    fn chat_request_deserializes_camel_case_and_normalizes_roles() {
        let req: ChatRequest = serde_json::from_value(json!({
            "currentMessage": "We sell protein bars",
            "conversationHistory": [
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello!"},
                {"role": "ai", "content": "Anything else?"}
            ],
            "baseSystemPrompt": "Be brief",
            "userMetadata": {"plan": "pro"}
        }))
        .unwrap();

        assert_eq!(req.current_message, "We sell protein bars");
        assert_eq!(req.conversation_history[1].role, MessageRole::Model);
        assert_eq!(req.conversation_history[2].role, MessageRole::Model);
        assert_eq!(req.base_system_prompt.as_deref(), Some("Be brief"));

        let cmd = req.into_command(Some("req-1".into()));
        assert_eq!(cmd.history.len(), 3);
        assert_eq!(cmd.request_id.as_deref(), Some("req-1"));
        assert!(cmd.user_metadata.unwrap().contains_key("plan"));
    }

    #[test]
    fn chat_request_tolerates_missing_optional_fields() {
        let req: ChatRequest = serde_json::from_value(json!({"currentMessage": "Hi"})).unwrap();
        assert!(req.conversation_history.is_empty());
        assert!(req.base_system_prompt.is_none());
    }

    #[test]
    fn chat_response_omits_absent_fields() {
        let outcome = ChatOutcome {
            message: "Tell me about your customers".into(),
            step: WorkflowStep::Discovery,
            context: ExtractedContext::new(vec![])
                .with_usp(Some("cold-pressed juice".into()))
                .with_trust_tier(Some(TrustTier::Follower)),
            flag: None,
        };

        let json = serde_json::to_value(ChatResponse::from(outcome)).unwrap();
        assert_eq!(
            json,
            json!({
                "message": "Tell me about your customers",
                "workflowStep": 1,
                "extractedUSP": "cold-pressed juice",
                "currentCircle": "follower"
            })
        );
    }

    #[test]
    fn chat_error_maps_to_public_message_and_code() {
        let rejected = ChatError::InputRejected {
            reason: InputRejection::Jailbreak,
        };
        let body = ChatResponse::from(&rejected);
        assert!(body.message.starts_with("I'm sorry"));
        assert_eq!(body.error.as_deref(), Some("input_rejected"));

        let failed = ChatError::GatewayFailure(AIError::unavailable("overloaded"));
        let body = ChatResponse::from(&failed);
        assert_eq!(body.message, "Error processing your request. Please try again.");
        assert_eq!(body.error.as_deref(), Some("gateway_failure"));
        assert!(!body.message.contains("overloaded"));
    }

    #[test]
    fn error_response_bad_request_creates_correctly() {
        let error = ErrorResponse::bad_request("invalid request body");
        assert_eq!(error.code, "BAD_REQUEST");
        assert_eq!(error.message, "invalid request body");
        assert!(error.details.is_none());
    }
}
