//! Immutable knowledge tables loaded once at startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::framework::Framework;
use super::sequence::SequenceTemplate;
use super::vertical::VerticalGuidance;

const EMBEDDED_FRAMEWORKS: &str = include_str!("../../../data/knowledge/frameworks.json");
const EMBEDDED_SEQUENCES: &str = include_str!("../../../data/knowledge/sequences.json");
const EMBEDDED_VERTICALS: &str = include_str!("../../../data/knowledge/verticals.json");

pub const FRAMEWORKS_FILE: &str = "frameworks.json";
pub const SEQUENCES_FILE: &str = "sequences.json";
pub const VERTICALS_FILE: &str = "verticals.json";

/// Failure to load the knowledge tables. Fatal at startup.
#[derive(Debug, Error)]
pub enum KnowledgeLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {table} table: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{table} table is empty")]
    Empty { table: &'static str },
}

/// The three lookup tables, keyed by lowercase key.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    frameworks: HashMap<String, Arc<Framework>>,
    sequences: HashMap<String, Arc<SequenceTemplate>>,
    verticals: HashMap<String, Arc<VerticalGuidance>>,
}

impl KnowledgeBase {
    /// Loads the copies compiled into the binary.
    pub fn embedded() -> Result<Self, KnowledgeLoadError> {
        Self::from_json(EMBEDDED_FRAMEWORKS, EMBEDDED_SEQUENCES, EMBEDDED_VERTICALS)
    }

    /// Loads `frameworks.json`, `sequences.json` and `verticals.json` from a directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, KnowledgeLoadError> {
        let dir = dir.as_ref();
        let read = |file: &str| {
            let path = dir.join(file);
            std::fs::read_to_string(&path).map_err(|source| KnowledgeLoadError::Io { path, source })
        };

        Self::from_json(
            &read(FRAMEWORKS_FILE)?,
            &read(SEQUENCES_FILE)?,
            &read(VERTICALS_FILE)?,
        )
    }

    /// Parses the three tables from JSON objects keyed by table key.
    pub fn from_json(
        frameworks: &str,
        sequences: &str,
        verticals: &str,
    ) -> Result<Self, KnowledgeLoadError> {
        let frameworks = parse_table::<Framework>("frameworks", frameworks)?;
        if frameworks.is_empty() {
            return Err(KnowledgeLoadError::Empty { table: "frameworks" });
        }

        Ok(Self {
            frameworks,
            sequences: parse_table("sequences", sequences)?,
            verticals: parse_table("verticals", verticals)?,
        })
    }

    pub fn framework(&self, key: &str) -> Option<&Arc<Framework>> {
        self.frameworks.get(key)
    }

    pub fn sequence(&self, key: &str) -> Option<&Arc<SequenceTemplate>> {
        self.sequences.get(key)
    }

    pub fn vertical(&self, key: &str) -> Option<&Arc<VerticalGuidance>> {
        self.verticals.get(key)
    }

    pub fn frameworks(&self) -> impl Iterator<Item = (&String, &Arc<Framework>)> {
        self.frameworks.iter()
    }

    pub fn sequences(&self) -> impl Iterator<Item = (&String, &Arc<SequenceTemplate>)> {
        self.sequences.iter()
    }

    pub fn framework_count(&self) -> usize {
        self.frameworks.len()
    }

    pub fn vertical_count(&self) -> usize {
        self.verticals.len()
    }
}

fn parse_table<T: serde::de::DeserializeOwned>(
    table: &'static str,
    json: &str,
) -> Result<HashMap<String, Arc<T>>, KnowledgeLoadError> {
    let rows: HashMap<String, T> =
        serde_json::from_str(json).map_err(|source| KnowledgeLoadError::Parse { table, source })?;

    Ok(rows
        .into_iter()
        .map(|(key, row)| (key.trim().to_lowercase(), Arc::new(row)))
        .collect())
}
