//! Copywriting frameworks.

use serde::{Deserialize, Serialize};

/// Minimum similarity a fuzzy framework lookup must exceed to be accepted.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.6;

/// A named copywriting structure with suitability metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framework {
    pub name: String,
    pub acronym: String,
    /// Ordered component steps, e.g. "Attention: Grab focus".
    pub components: Vec<String>,
    pub best_for: Vec<String>,
    #[serde(rename = "emotional_tone")]
    pub tone: String,
    pub funnel_stage: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub criticisms: String,
    /// Relevance score on a 0-10 scale.
    #[serde(rename = "score")]
    pub relevance_score: f64,
}

impl Framework {
    /// Lowercase acronym used as the table key.
    pub fn key(&self) -> String {
        self.acronym.to_lowercase()
    }

    /// The headline use case, if any.
    pub fn primary_use(&self) -> Option<&str> {
        self.best_for.first().map(String::as_str)
    }
}

/// Fraction of query words found as substrings of the key or display name.
///
/// Returns 0.0 for an empty query.
pub fn similarity_score(query: &str, key: &str, name: &str) -> f64 {
    let query = query.to_lowercase();
    let words: Vec<&str> = query.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let key = key.to_lowercase();
    let name = name.to_lowercase();
    let hits = words
        .iter()
        .filter(|w| key.contains(*w) || name.contains(*w))
        .count();

    hits as f64 / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_query_word_matching_scores_one() {
        assert_eq!(similarity_score("aida framework", "aida", "AIDA Framework"), 1.0);
    }

    #[test]
    fn partial_match_scores_fraction() {
        let score = similarity_score("pas copy", "pas", "PAS Framework");
        assert!((score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_query_scores_zero() {
        assert_eq!(similarity_score("   ", "aida", "AIDA Framework"), 0.0);
    }

    #[test]
    fn deserializes_table_row() {
        let json = r#"{
            "name": "PAS Framework",
            "acronym": "PAS",
            "components": ["Problem", "Agitate", "Solve"],
            "best_for": ["MOFU"],
            "emotional_tone": "urgent",
            "funnel_stage": "MOFU",
            "score": 8.9
        }"#;
        let fw: Framework = serde_json::from_str(json).unwrap();
        assert_eq!(fw.key(), "pas");
        assert_eq!(fw.primary_use(), Some("MOFU"));
        assert!(fw.example.is_empty());
    }
}
