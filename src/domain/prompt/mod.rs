//! Prompt domain module.
//!
//! Builds the layered instruction document handed to the model gateway.

mod base_prompt;
mod composer;
mod output_format;

pub use base_prompt::{DEFAULT_BASE_PROMPT, SECURITY_REFUSAL};
pub use composer::{ComposedPrompt, CompositionInput, PromptComposer, COMPLIANCE_MANDATE};
pub use output_format::{
    OutputFormatSpec, DEFAULT_CADENCE, MAX_EMAIL_LENGTH, READABILITY_LEVEL, SEQUENCE_TABLE_COLUMNS,
};
