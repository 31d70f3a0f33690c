//! Conversation domain module.
//!
//! Reconstructs where a stateless conversation stands: messages in, extracted
//! facts and the current workflow step out.

mod context;
mod engine;
mod extractor;
mod message;
mod step;

pub use context::{ExtractedContext, TrustTier, Vertical};
pub use engine::{CompletionKeywords, CompletionSignals, WorkflowStateMachine};
pub use extractor::{FieldExtractor, TextField, VERTICAL_VOTE_THRESHOLD};
pub use message::{ConversationMessage, MessageRole};
pub use step::WorkflowStep;
