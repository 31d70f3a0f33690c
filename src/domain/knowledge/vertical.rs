use serde::{Deserialize, Serialize};

/// Copywriting guidance for one business vertical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalGuidance {
    pub vertical_name: String,
    pub characteristics: Vec<String>,
    pub key_principles: Vec<String>,
    #[serde(default)]
    pub common_outcomes: Vec<String>,
    #[serde(default)]
    pub unique_considerations: String,
}
