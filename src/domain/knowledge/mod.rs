//! Knowledge domain module.
//!
//! Read-only reference data (copywriting frameworks, sequence templates and
//! vertical guidance) and the cached resolver that queries it.

mod base;
mod framework;
mod resolver;
mod sequence;
mod vertical;

pub use base::{KnowledgeBase, KnowledgeLoadError, FRAMEWORKS_FILE, SEQUENCES_FILE, VERTICALS_FILE};
pub use framework::{similarity_score, Framework, FUZZY_MATCH_THRESHOLD};
pub use resolver::{step_framework_keys, vertical_framework_keys, KnowledgeContext, KnowledgeResolver};
pub use sequence::{normalize_key, sequence_key, SequenceTemplate, FALLBACK_VERTICAL};
pub use vertical::VerticalGuidance;
