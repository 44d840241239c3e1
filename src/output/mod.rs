//! Output module for persisting results and reporting runs
//!
//! This module handles:
//! - Persisting the final collection through a `ResultSink` (JSON file or SQLite)
//! - Generating markdown summaries of harvest runs
//! - Printing run statistics to the console

mod json_output;
mod markdown;
mod sqlite_output;
pub mod stats;
mod traits;

pub use json_output::JsonFileSink;
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use sqlite_output::SqliteSink;
pub use stats::print_summary;
pub use traits::{CollectionDocument, CrawlSummary, ResultSink, SinkError, SinkResult};

use crate::config::{OutputConfig, OutputFormat};
use std::path::Path;

/// Builds the sink selected by the output configuration
///
/// Neither sink touches the filesystem until `persist` is called.
///
/// # Arguments
///
/// * `output` - The output section of the configuration
/// * `config_hash` - Hash recorded alongside SQLite runs
pub fn build_sink(output: &OutputConfig, config_hash: &str) -> Box<dyn ResultSink> {
    let path = Path::new(&output.destination);

    match output.format {
        OutputFormat::Json => Box::new(JsonFileSink::new(path)),
        OutputFormat::Sqlite => Box::new(SqliteSink::open(path, config_hash)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output_config(destination: &str, format: OutputFormat) -> OutputConfig {
        OutputConfig {
            destination: destination.to_string(),
            format,
            collection_field: "quotes".to_string(),
            summary_path: None,
        }
    }

    #[test]
    fn test_build_json_sink() {
        let sink = build_sink(&output_config("facts.json", OutputFormat::Json), "hash");
        assert_eq!(sink.destination(), "facts.json");
    }

    #[test]
    fn test_build_sqlite_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.db");

        let sink = build_sink(
            &output_config(path.to_str().unwrap(), OutputFormat::Sqlite),
            "hash",
        );
        assert!(sink.destination().starts_with("sqlite:"));
        assert!(!path.exists());
    }
}
