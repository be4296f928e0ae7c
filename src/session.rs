use std::path::{Path, PathBuf};

use crate::config::ExplorerConfig;
use crate::data::cleaner::Cleaner;
use crate::data::loader::{load_file, LoadError};
use crate::data::model::CleanTable;

// ---------------------------------------------------------------------------
// Explorer session: owns the loaded table
// ---------------------------------------------------------------------------

/// Context handed to every pipeline stage: the settings, the input path and,
/// once loaded, the cleaned table.
///
/// The table is built by [`load`](Self::load) and dropped by
/// [`invalidate`](Self::invalidate); nothing else mutates it.
#[derive(Debug)]
pub struct ExplorerSession {
    config: ExplorerConfig,
    data_path: PathBuf,
    table: Option<CleanTable>,
}

impl ExplorerSession {
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            data_path: config.data_path.clone(),
            config,
            table: None,
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Point the session at another file; the current table is dropped.
    pub fn set_data_path(&mut self, path: impl Into<PathBuf>) {
        self.data_path = path.into();
        self.invalidate();
    }

    pub fn table(&self) -> Option<&CleanTable> {
        self.table.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// Load and clean the data file unless a table is already held.
    pub fn load(&mut self) -> Result<&CleanTable, LoadError> {
        let table = match self.table.take() {
            Some(table) => table,
            None => {
                let raw = load_file(&self.data_path, &self.config.columns())?;
                let cleaned = Cleaner::new(self.config.default_year).clean(&raw);
                log::info!(
                    "Session ready: {} papers from {}",
                    cleaned.len(),
                    self.data_path.display()
                );
                cleaned
            }
        };
        Ok(&*self.table.insert(table))
    }

    /// Drop the current table and load the file again.
    pub fn reload(&mut self) -> Result<&CleanTable, LoadError> {
        self.invalidate();
        self.load()
    }

    pub fn invalidate(&mut self) {
        if self.table.take().is_some() {
            log::debug!("Session table invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(rows: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "title,abstract,journal,publish_time,source_x").unwrap();
        write!(file, "{rows}").unwrap();
        file
    }

    fn session_for(path: &Path) -> ExplorerSession {
        ExplorerSession::new(ExplorerConfig {
            data_path: path.to_path_buf(),
            ..ExplorerConfig::default()
        })
    }

    #[test]
    fn load_builds_clean_table_once() {
        let file = csv_file("A,one two,lancet,2021-01-01,PMC\n");
        let mut session = session_for(file.path());
        assert!(!session.is_loaded());

        let table = session.load().expect("load");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].journal_clean, "Lancet");
        assert!(session.is_loaded());
    }

    #[test]
    fn reload_picks_up_file_changes() {
        let mut file = csv_file("A,,,2021,PMC\n");
        let mut session = session_for(file.path());
        assert_eq!(session.load().expect("load").len(), 1);

        writeln!(file, "B,,,2022,PMC").unwrap();
        file.flush().unwrap();
        assert_eq!(session.load().expect("cached").len(), 1);
        assert_eq!(session.reload().expect("reload").len(), 2);
    }

    #[test]
    fn missing_file_leaves_session_empty() {
        let mut session = session_for(Path::new("/no/such/file.csv"));
        assert!(matches!(session.load(), Err(LoadError::NotFound { .. })));
        assert!(session.table().is_none());
    }

    #[test]
    fn changing_path_invalidates() {
        let file = csv_file("A,,,2021,PMC\n");
        let mut session = session_for(file.path());
        session.load().expect("load");
        session.set_data_path("/elsewhere.csv");
        assert!(!session.is_loaded());
        assert_eq!(session.data_path(), Path::new("/elsewhere.csv"));
    }

    #[test]
    fn default_year_comes_from_config() {
        let file = csv_file("A,,,sometime,PMC\n");
        let mut session = ExplorerSession::new(ExplorerConfig {
            data_path: file.path().to_path_buf(),
            default_year: 2001,
            ..ExplorerConfig::default()
        });
        assert_eq!(session.load().expect("load").rows[0].publication_year, 2001);
    }
}
