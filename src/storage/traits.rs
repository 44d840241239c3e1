//! Storage traits and error types

use crate::storage::RunRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `collection` - Name of the collection field being stored
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, collection: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recently created run, if any
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as completed and records its item count
    fn complete_run(&mut self, run_id: i64, item_count: u64) -> StorageResult<()>;

    /// Marks a run as failed
    fn fail_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Items =====

    /// Stores the items of a run, preserving their order, in one transaction
    fn insert_items(&mut self, run_id: i64, items: &[String]) -> StorageResult<()>;

    /// Loads the items of a run in stored order
    fn load_items(&self, run_id: i64) -> StorageResult<Vec<String>>;
}
