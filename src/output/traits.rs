//! Output sink traits and types
//!
//! This module defines the trait interface for result sinks, the structured
//! document they receive, and the run summary.

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// Errors that can occur while persisting the final collection
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// The final collection as handed to a sink: a mapping with a single named
/// field holding the sorted, deduplicated items
///
/// Serializes as `{"<field>": ["item", ...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDocument {
    field: String,
    items: Vec<String>,
}

impl CollectionDocument {
    pub fn new(field: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            field: field.into(),
            items,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Serialize for CollectionDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.items)?;
        map.end()
    }
}

/// Durable destination for the final collection
///
/// Called at most once per run, after aggregation.
pub trait ResultSink: Send {
    /// Persists the document
    fn persist(&mut self, document: &CollectionDocument) -> SinkResult<()>;

    /// Human-readable description of where output goes
    fn destination(&self) -> String;
}

/// Summary of a complete harvest run
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub started_at: String,
    pub finished_at: String,
    pub duration_seconds: f64,
    pub config_hash: Option<String>,
    pub concurrency_limit: u32,

    // Page statistics
    pub pages_attempted: u32,
    pub pages_succeeded: u32,
    pub pages_failed: u32,
    pub failed_pages: Vec<u32>,

    // Item statistics
    pub raw_items: usize,
    pub unique_items: usize,

    // Output
    pub destination: String,
    pub output_written: bool,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_attempted == 0 {
            return 0.0;
        }
        (self.pages_succeeded as f64 / self.pages_attempted as f64) * 100.0
    }

    /// Number of raw items dropped as duplicates
    pub fn duplicates_removed(&self) -> usize {
        self.raw_items.saturating_sub(self.unique_items)
    }
}
