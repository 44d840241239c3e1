//! SQLite-based result sink
//!
//! Records each persisted collection as a run in the storage backend, with one
//! row per item in sorted order.

use crate::output::traits::{CollectionDocument, ResultSink, SinkResult};
use crate::storage::{SqliteStorage, Storage};
use std::path::{Path, PathBuf};

/// Result sink writing into a SQLite database
///
/// The database file is opened (and created) on the first `persist`, so a run
/// that never reaches persistence leaves nothing on disk.
pub struct SqliteSink {
    storage: Option<SqliteStorage>,
    path: PathBuf,
    config_hash: String,
    last_run: Option<i64>,
}

impl SqliteSink {
    /// Creates a sink for the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration, stored with each run
    pub fn open(path: &Path, config_hash: &str) -> Self {
        Self {
            storage: None,
            path: path.to_path_buf(),
            config_hash: config_hash.to_string(),
            last_run: None,
        }
    }

    /// Creates a sink over an already opened storage backend
    pub fn with_storage(storage: SqliteStorage, path: &Path, config_hash: &str) -> Self {
        Self {
            storage: Some(storage),
            ..Self::open(path, config_hash)
        }
    }

    /// ID of the run written by the most recent successful `persist`
    pub fn last_run(&self) -> Option<i64> {
        self.last_run
    }

    /// The storage backend, once it has been opened
    pub fn storage(&self) -> Option<&SqliteStorage> {
        self.storage.as_ref()
    }

    fn storage_mut(&mut self) -> SinkResult<&mut SqliteStorage> {
        let storage = match self.storage.take() {
            Some(storage) => storage,
            None => {
                tracing::debug!("Opening database {}", self.path.display());
                SqliteStorage::new(&self.path)?
            }
        };
        Ok(self.storage.insert(storage))
    }
}

impl ResultSink for SqliteSink {
    fn persist(&mut self, document: &CollectionDocument) -> SinkResult<()> {
        let config_hash = self.config_hash.clone();
        let storage = self.storage_mut()?;
        let run_id = storage.create_run(&config_hash, document.field())?;

        if let Err(e) = storage.insert_items(run_id, document.items()) {
            tracing::error!("Failed to store items for run {}: {}", run_id, e);
            if let Err(mark) = storage.fail_run(run_id) {
                tracing::warn!("Could not mark run {} as failed: {}", run_id, mark);
            }
            return Err(e.into());
        }

        storage.complete_run(run_id, document.len() as u64)?;
        self.last_run = Some(run_id);

        tracing::debug!(
            "Stored {} items as run {} in {}",
            document.len(),
            run_id,
            self.path.display()
        );
        Ok(())
    }

    fn destination(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RunStatus;

    fn create_sink() -> SqliteSink {
        let storage = SqliteStorage::new_in_memory().unwrap();
        SqliteSink::with_storage(storage, Path::new(":memory:"), "test_hash")
    }

    #[test]
    fn test_persist_records_run_and_items() {
        let mut sink = create_sink();
        let document =
            CollectionDocument::new("quotes", vec!["a".to_string(), "b".to_string()]);

        sink.persist(&document).unwrap();

        let run_id = sink.last_run().unwrap();
        let run = sink.storage().unwrap().get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.collection, "quotes");
        assert_eq!(run.config_hash, "test_hash");
        assert_eq!(run.item_count, Some(2));
        assert_eq!(sink.storage().unwrap().load_items(run_id).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_failed_insert_marks_run_failed() {
        let mut sink = create_sink();
        let document =
            CollectionDocument::new("quotes", vec!["dup".to_string(), "dup".to_string()]);

        assert!(sink.persist(&document).is_err());
        assert!(sink.last_run().is_none());

        let run = sink.storage().unwrap().get_latest_run().unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Failed);
    }

    #[test]
    fn test_database_created_on_first_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvest.db");

        let mut sink = SqliteSink::open(&path, "hash");
        assert!(!path.exists());
        assert!(sink.storage().is_none());

        sink.persist(&CollectionDocument::new("quotes", vec!["x".to_string()]))
            .unwrap();

        assert!(path.exists());
        assert_eq!(sink.destination(), format!("sqlite:{}", path.display()));
    }
}
