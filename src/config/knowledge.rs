//! Knowledge store location

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::knowledge::{KnowledgeBase, KnowledgeLoadError};

/// Where the reference tables come from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory holding the three JSON tables. Unset uses the embedded copies.
    pub data_dir: Option<PathBuf>,
}

impl KnowledgeConfig {
    /// Loads the tables once. Failure here is fatal to startup.
    pub fn load(&self) -> Result<KnowledgeBase, KnowledgeLoadError> {
        match &self.data_dir {
            Some(dir) => KnowledgeBase::from_dir(dir),
            None => KnowledgeBase::embedded(),
        }
    }

    pub fn source_label(&self) -> String {
        self.data_dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "embedded".to_string())
    }
}
