//! Conversation messages supplied by the caller.
//!
//! Messages are immutable records of user/model exchanges. The service keeps
//! no copy of them between requests; every request carries the full history.

use serde::{Deserialize, Serialize};

/// Role of a message sender in a conversation.
///
/// Clients label model turns inconsistently (`model`, `ai`, `assistant`),
/// so every spelling collapses to [`MessageRole::Model`] on the way in.
/// Anything unrecognised is treated as user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MessageRole {
    /// User input.
    User,
    /// Model (assistant) response.
    Model,
}

impl MessageRole {
    /// Parses a caller-supplied role label.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "model" | "ai" | "assistant" => Self::Model,
            _ => Self::User,
        }
    }

    /// Canonical wire token for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }

    /// Returns true if the message was authored by the model.
    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model)
    }
}

impl From<String> for MessageRole {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single turn of the conversation, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Who sent the message.
    pub role: MessageRole,
    /// Message body.
    #[serde(default)]
    pub content: String,
}

impl ConversationMessage {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates a model message.
    pub fn model(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Model, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod role_parsing {
        use super::*;

        #[test]
        fn assistant_spellings_collapse_to_model() {
            for label in ["model", "ai", "assistant", "Assistant", " AI "] {
                assert_eq!(MessageRole::parse(label), MessageRole::Model, "{label}");
            }
        }

        #[test]
        fn unknown_roles_default_to_user() {
            assert_eq!(MessageRole::parse("system"), MessageRole::User);
            assert_eq!(MessageRole::parse(""), MessageRole::User);
        }

        #[test]
        fn deserializes_legacy_role_labels() {
            let msg: ConversationMessage =
                serde_json::from_str(r#"{"role":"ai","content":"Hi there"}"#).unwrap();
            assert_eq!(msg.role, MessageRole::Model);
            assert_eq!(msg.content, "Hi there");
        }

        #[test]
        fn serializes_canonical_role_token() {
            let json = serde_json::to_string(&ConversationMessage::model("ok")).unwrap();
            assert_eq!(json, r#"{"role":"model","content":"ok"}"#);
        }
    }

    #[test]
    fn missing_content_defaults_to_empty() {
        let msg: ConversationMessage = serde_json::from_str(r#"{"role":"user"}"#).unwrap();
        assert!(msg.content.is_empty());
    }
}
