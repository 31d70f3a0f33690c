//! Advisory review of generated text.
//!
//! Flags are reported to the caller for logging and never block a response.

use crate::domain::conversation::WorkflowStep;

const SPAM_PHRASES: &[&str] = &[
    "click here now",
    "limited time",
    "act now",
    "urgent",
    "guaranteed",
    "free money",
    "no risk",
    "100% free",
];

/// Distinct spam phrases tolerated before a response is flagged.
pub const SPAM_HIT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFlag {
    /// Too many distinct spam-indicator phrases.
    SpamDensity { hits: usize, step: WorkflowStep },
}

impl std::fmt::Display for OutputFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SpamDensity { hits, step } => {
                write!(f, "{hits} spam indicator phrases in {step} response")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputValidator;

impl OutputValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn review(&self, text: &str, step: WorkflowStep) -> Option<OutputFlag> {
        if text.is_empty() {
            return None;
        }

        let lower = text.to_lowercase();
        let hits = SPAM_PHRASES.iter().filter(|p| lower.contains(*p)).count();
        (hits > SPAM_HIT_LIMIT).then_some(OutputFlag::SpamDensity { hits, step })
    }
}
