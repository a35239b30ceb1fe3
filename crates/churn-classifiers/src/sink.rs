//! Artifact output abstraction.
//!
//! All side-effecting output (report pages, run records, serialized model
//! blobs) goes through an [`ArtifactSink`], so production writes to the
//! filesystem while tests assert on an in-memory recorder.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ChurnError;

/// Destination for every artifact the pipeline emits. Writing the same
/// name twice overwrites; there is no versioning.
pub trait ArtifactSink {
    /// Write an HTML report page.
    fn write_page(&mut self, name: &str, html: &str) -> Result<(), ChurnError>;

    /// Write a structured run record (JSON).
    fn write_record(&mut self, name: &str, json: &str) -> Result<(), ChurnError>;

    /// Persist a serialized model blob.
    fn persist_model(&mut self, name: &str, bytes: &[u8]) -> Result<(), ChurnError>;

    /// Read a previously persisted model blob back.
    fn load_model(&self, name: &str) -> Result<Vec<u8>, ChurnError>;
}

/// Filesystem sink: pages under `<root>/images/`, records under `<root>/`,
/// model blobs under `<root>/models/`.
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        FsSink {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8], name: &str) -> Result<(), ChurnError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ChurnError::PersistenceFailure {
                artifact: name.to_string(),
                reason: e.to_string(),
            })?;
        }
        fs::write(path, bytes).map_err(|e| ChurnError::PersistenceFailure {
            artifact: name.to_string(),
            reason: e.to_string(),
        })
    }
}

impl ArtifactSink for FsSink {
    fn write_page(&mut self, name: &str, html: &str) -> Result<(), ChurnError> {
        let path = self.root.join("images").join(name);
        self.write_bytes(&path, html.as_bytes(), name)
    }

    fn write_record(&mut self, name: &str, json: &str) -> Result<(), ChurnError> {
        let path = self.root.join(name);
        self.write_bytes(&path, json.as_bytes(), name)
    }

    fn persist_model(&mut self, name: &str, bytes: &[u8]) -> Result<(), ChurnError> {
        let path = self.root.join("models").join(name);
        self.write_bytes(&path, bytes, name)
    }

    fn load_model(&self, name: &str) -> Result<Vec<u8>, ChurnError> {
        let path = self.root.join("models").join(name);
        fs::read(&path).map_err(|e| ChurnError::PersistenceFailure {
            artifact: name.to_string(),
            reason: e.to_string(),
        })
    }
}

/// In-memory sink for tests: records every artifact by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub pages: BTreeMap<String, String>,
    pub records: BTreeMap<String, String>,
    pub models: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }
}

impl ArtifactSink for MemorySink {
    fn write_page(&mut self, name: &str, html: &str) -> Result<(), ChurnError> {
        self.pages.insert(name.to_string(), html.to_string());
        Ok(())
    }

    fn write_record(&mut self, name: &str, json: &str) -> Result<(), ChurnError> {
        self.records.insert(name.to_string(), json.to_string());
        Ok(())
    }

    fn persist_model(&mut self, name: &str, bytes: &[u8]) -> Result<(), ChurnError> {
        self.models.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn load_model(&self, name: &str) -> Result<Vec<u8>, ChurnError> {
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| ChurnError::PersistenceFailure {
                artifact: name.to_string(),
                reason: "model blob was never persisted".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_round_trips_blobs() {
        let mut sink = MemorySink::new();
        sink.persist_model("model.json", b"{}").unwrap();
        assert_eq!(sink.load_model("model.json").unwrap(), b"{}");
        assert!(sink.load_model("other.json").is_err());
    }

    #[test]
    fn memory_sink_overwrites_pages() {
        let mut sink = MemorySink::new();
        sink.write_page("roc.html", "<html>v1</html>").unwrap();
        sink.write_page("roc.html", "<html>v2</html>").unwrap();
        assert_eq!(sink.pages.len(), 1);
        assert!(sink.pages["roc.html"].contains("v2"));
    }

    #[test]
    fn fs_sink_writes_under_fixed_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsSink::new(dir.path());
        sink.write_page("results/roc_curve_result.html", "<html></html>")
            .unwrap();
        sink.persist_model("rfc_model.json", b"{}").unwrap();
        sink.write_record("run_config.json", "{}").unwrap();

        assert!(dir
            .path()
            .join("images/results/roc_curve_result.html")
            .is_file());
        assert!(dir.path().join("models/rfc_model.json").is_file());
        assert!(dir.path().join("run_config.json").is_file());
        assert_eq!(sink.load_model("rfc_model.json").unwrap(), b"{}");
    }

    #[test]
    fn fs_sink_missing_model_is_a_persistence_failure() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsSink::new(dir.path());
        let err = sink.load_model("nope.json").unwrap_err();
        assert!(matches!(err, ChurnError::PersistenceFailure { .. }));
    }
}
