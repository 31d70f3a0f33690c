//! Chat pipeline limits

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::validation::DEFAULT_MAX_INPUT_CHARS;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Character ceiling for the current message
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Most recent history messages forwarded to the gateway
    #[serde(default = "default_max_history")]
    pub max_history_messages: usize,
}

impl ChatConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_input_chars == 0 {
            return Err(ValidationError::InvalidInputLimit);
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
            max_history_messages: default_max_history(),
        }
    }
}

fn default_max_input_chars() -> usize {
    DEFAULT_MAX_INPUT_CHARS
}

fn default_max_history() -> usize {
    20
}
