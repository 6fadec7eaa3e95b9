//! Artifact index: generated files with their SHA-256 digests.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::HarnessError;
use crate::structured_log::now_utc;

/// A single artifact entry in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Path relative to the index's directory.
    pub path: String,
    pub kind: String,
    pub sha256: String,
    pub size_bytes: u64,
}

/// Index linking a run to the artifacts it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub index_version: u32,
    pub run_id: String,
    pub generated_utc: String,
    pub artifacts: Vec<ArtifactEntry>,
}

impl ArtifactIndex {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            index_version: 1,
            run_id: run_id.into(),
            generated_utc: now_utc(),
            artifacts: Vec::new(),
        }
    }

    /// Record in-memory content under `path`.
    pub fn add_bytes(&mut self, path: impl Into<String>, kind: impl Into<String>, data: &[u8]) {
        self.artifacts.push(ArtifactEntry {
            path: path.into(),
            kind: kind.into(),
            sha256: sha256_hex(data),
            size_bytes: data.len() as u64,
        });
    }

    /// Hash a file on disk and record it as `name`.
    pub fn add_file(&mut self, file: &Path, name: &str, kind: &str) -> Result<(), HarnessError> {
        let data = std::fs::read(file).map_err(|e| HarnessError::io(file, e))?;
        self.add_bytes(name, kind, &data);
        Ok(())
    }

    /// Re-hash every entry under `root`; returns the paths whose digest changed
    /// or that can no longer be read.
    #[must_use]
    pub fn stale_entries(&self, root: &Path) -> Vec<String> {
        self.artifacts
            .iter()
            .filter(|entry| match std::fs::read(root.join(&entry.path)) {
                Ok(data) => sha256_hex(&data) != entry.sha256,
                Err(_) => true,
            })
            .map(|entry| entry.path.clone())
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Lowercase hex SHA-256 of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vectors() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn index_serializes_entries() {
        let mut idx = ArtifactIndex::new("run-001");
        idx.add_bytes("wasmlibc_shim.h", "header", b"abc");
        let parsed: serde_json::Value =
            serde_json::from_str(&idx.to_json().expect("json")).expect("parse");
        assert_eq!(parsed["index_version"], 1);
        assert_eq!(parsed["run_id"], "run-001");
        assert_eq!(parsed["artifacts"][0]["size_bytes"], 3);
        assert_eq!(parsed["artifacts"][0]["kind"], "header");
    }
}
