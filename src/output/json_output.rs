//! JSON file result sink

use crate::output::traits::{CollectionDocument, ResultSink, SinkError, SinkResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the collection document as pretty-printed JSON (2-space indent)
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonFileSink {
    fn persist(&mut self, document: &CollectionDocument) -> SinkResult<()> {
        let file = File::create(&self.path).map_err(|e| {
            SinkError::Write(format!("cannot create {}: {}", self.path.display(), e))
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::debug!("JSON saved to {}", self.path.display());
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.json");

        let mut sink = JsonFileSink::new(&path);
        let document =
            CollectionDocument::new("quotes", vec!["a".to_string(), "b".to_string()]);
        sink.persist(&document).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"quotes\": [\n    \"a\",\n    \"b\"\n  ]\n}\n");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.json");
        std::fs::write(&path, "stale content that is longer than the new output").unwrap();

        let mut sink = JsonFileSink::new(&path);
        sink.persist(&CollectionDocument::new("quotes", vec!["x".to_string()]))
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({ "quotes": ["x"] }));
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/facts.json");

        let mut sink = JsonFileSink::new(&path);
        let result = sink.persist(&CollectionDocument::new("quotes", vec![]));
        assert!(matches!(result, Err(SinkError::Write(_))));
    }
}
