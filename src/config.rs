use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::cleaner::DEFAULT_YEAR;
use crate::data::model::ColumnNames;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup settings. Every field has a default, so a config file only
/// needs the keys it changes:
///
/// ```json
/// { "data_path": "data/metadata.csv", "default_year": 2020 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Metadata file opened at startup.
    pub data_path: PathBuf,
    /// Name of the source identifier column.
    pub source_column: String,
    /// Year given to papers whose `publish_time` cannot be parsed.
    pub default_year: i32,
    /// Initial contents of the extra stop-word box (comma-separated).
    pub extra_stop_words: String,
    pub top_words: usize,
    pub top_journals: usize,
    pub min_journal_papers: usize,
    /// Journals offered in the explorer's journal filter.
    pub explorer_journal_options: usize,
    /// Rows shown in the explorer result table.
    pub preview_rows: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("metadata.csv"),
            source_column: ColumnNames::default().source,
            default_year: DEFAULT_YEAR,
            extra_stop_words: "covid, coronavirus, sars, cov, pandemic".to_string(),
            top_words: 20,
            top_journals: 15,
            min_journal_papers: 10,
            explorer_journal_options: 20,
            preview_rows: 100,
        }
    }
}

impl ExplorerConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, or the given file when there is one.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                let config = Self::from_file(p)?;
                log::debug!("Loaded config from {}", p.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn columns(&self) -> ColumnNames {
        ColumnNames::new(self.source_column.clone())
    }
}
