//! Outcome-to-sequence templates.

use serde::{Deserialize, Serialize};

/// Vertical used when no template exists for the requested one.
pub const FALLBACK_VERTICAL: &str = "dtc";

/// A pre-authored email cadence for an outcome within a vertical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceTemplate {
    pub outcome: String,
    pub vertical: String,
    pub duration: String,
    #[serde(rename = "touch_points")]
    pub touch_point_count: u32,
    pub triggers: Vec<String>,
    pub cadence: String,
    pub frameworks: Vec<String>,
    pub key_messages: Vec<String>,
    pub branching_logic: String,
}

/// Normalizes free text into a table key segment.
///
/// Lowercases and collapses each run of non-alphanumeric characters into a
/// single `_`, trimming leading and trailing separators.
pub fn normalize_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for c in raw.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            pending_sep = false;
            key.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }

    key
}

/// Table key for an outcome and vertical pair.
pub fn sequence_key(outcome: &str, vertical: &str) -> String {
    format!("{}_{}", normalize_key(outcome), normalize_key(vertical))
}
