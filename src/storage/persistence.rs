//! Snapshot Persistence
//!
//! The store itself is purely in-memory. A [`Persistence`] backend is asked
//! for the full document map and index table once at startup, and is handed
//! both maps after every successful mutating command.
//!
//! ## On-Disk Format
//!
//! [`JsonFilePersistence`] writes a single JSON document:
//!
//! ```text
//! {
//!   "documents": { "<key>": { "payload": {...}, "ttl_ms": ..., ... } },
//!   "indices":   { "<bucket>": { "<entry>": <value> } }
//! }
//! ```
//!
//! Writes go to a sibling temp file which is then renamed over the target, so
//! a crash mid-write leaves the previous snapshot intact.

use crate::storage::engine::{Documents, Indices};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading or saving a snapshot.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The snapshot could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A place the store is loaded from and saved to.
pub trait Persistence {
    /// Loads the documents and index buckets. An absent snapshot is empty.
    fn load(&mut self) -> PersistenceResult<(Documents, Indices)>;

    /// Saves the documents and index buckets, replacing the previous snapshot.
    fn save(&mut self, documents: &Documents, indices: &Indices) -> PersistenceResult<()>;
}

impl<T: Persistence + ?Sized> Persistence for Box<T> {
    fn load(&mut self) -> PersistenceResult<(Documents, Indices)> {
        (**self).load()
    }

    fn save(&mut self, documents: &Documents, indices: &Indices) -> PersistenceResult<()> {
        (**self).save(documents, indices)
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    documents: &'a Documents,
    indices: &'a Indices,
}

#[derive(Deserialize, Default)]
struct Snapshot {
    #[serde(default)]
    documents: Documents,
    #[serde(default)]
    indices: Indices,
}

fn encode(documents: &Documents, indices: &Indices) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(&SnapshotRef { documents, indices })
}

fn decode(bytes: &[u8]) -> serde_json::Result<(Documents, Indices)> {
    let snapshot: Snapshot = serde_json::from_slice(bytes)?;
    Ok((snapshot.documents, snapshot.indices))
}

// ============================================================================
// JSON file
// ============================================================================

/// Persists snapshots to a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Creates a backend writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Persistence for JsonFilePersistence {
    fn load(&mut self) -> PersistenceResult<(Documents, Indices)> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let (documents, indices) = decode(&bytes)?;
                info!(
                    path = %self.path.display(),
                    documents = documents.len(),
                    buckets = indices.len(),
                    "Loaded snapshot"
                );
                Ok((documents, indices))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No snapshot found, starting empty");
                Ok((Documents::new(), Indices::new()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, documents: &Documents, indices: &Indices) -> PersistenceResult<()> {
        let bytes = encode(documents, indices)?;
        let temp = self.temp_path();

        fs::write(&temp, &bytes)?;
        fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Saved snapshot");
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Keeps the latest snapshot as encoded JSON in memory.
///
/// Useful when embedding the store in a host that owns its own storage: the
/// host can read [`MemoryPersistence::contents`] after each command.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    contents: Option<Vec<u8>>,
    saves: usize,
}

impl MemoryPersistence {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend seeded with an encoded snapshot.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: Some(contents.into()),
            saves: 0,
        }
    }

    /// The last saved snapshot, encoded as JSON.
    pub fn contents(&self) -> Option<&[u8]> {
        self.contents.as_deref()
    }

    /// Number of times `save` has been called.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Persistence for MemoryPersistence {
    fn load(&mut self) -> PersistenceResult<(Documents, Indices)> {
        match &self.contents {
            Some(bytes) => Ok(decode(bytes)?),
            None => Ok((Documents::new(), Indices::new())),
        }
    }

    fn save(&mut self, documents: &Documents, indices: &Indices) -> PersistenceResult<()> {
        self.contents = Some(encode(documents, indices)?);
        self.saves += 1;
        Ok(())
    }
}

/// A backend that starts empty and discards every save.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl Persistence for NoPersistence {
    fn load(&mut self) -> PersistenceResult<(Documents, Indices)> {
        Ok((Documents::new(), Indices::new()))
    }

    fn save(&mut self, _documents: &Documents, _indices: &Indices) -> PersistenceResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::engine::IndexBucket;
    use crate::storage::record::Record;
    use serde_json::json;

    fn sample() -> (Documents, Indices) {
        let mut documents = Documents::new();
        let payload = json!({"status": "active", "n": 3}).as_object().cloned().unwrap();
        documents.insert("u".into(), Record::new(payload, Some(500), 1_000));

        let mut indices = Indices::new();
        let mut eq = IndexBucket::new();
        eq.insert("status".into(), json!("active"));
        indices.insert("u".into(), eq);
        // Stale bucket for a key that does not exist
        let mut stale = IndexBucket::new();
        stale.insert("gone".into(), json!({"n": 1}));
        indices.insert("RANGE:n:0-5".into(), stale);

        (documents, indices)
    }

    #[test]
    fn test_json_file_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = JsonFilePersistence::new(dir.path().join("absent.json"));

        let (documents, indices) = backend.load().unwrap();
        assert!(documents.is_empty());
        assert!(indices.is_empty());
    }

    #[test]
    fn test_json_file_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let (documents, indices) = sample();

        JsonFilePersistence::new(&path)
            .save(&documents, &indices)
            .unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("store.json.tmp").exists());

        let (loaded_docs, loaded_indices) = JsonFilePersistence::new(&path).load().unwrap();
        assert_eq!(loaded_docs, documents);
        assert_eq!(loaded_indices, indices);
    }

    #[test]
    fn test_json_file_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{not json").unwrap();

        let err = JsonFilePersistence::new(&path).load().unwrap_err();
        assert!(matches!(err, PersistenceError::Serialization(_)));
    }

    #[test]
    fn test_memory_persistence() {
        let (documents, indices) = sample();
        let mut backend = MemoryPersistence::new();

        assert!(backend.load().unwrap().0.is_empty());

        backend.save(&documents, &indices).unwrap();
        assert_eq!(backend.saves(), 1);

        let mut reopened = MemoryPersistence::with_contents(backend.contents().unwrap());
        let (loaded_docs, loaded_indices) = reopened.load().unwrap();
        assert_eq!(loaded_docs, documents);
        assert_eq!(loaded_indices, indices);
    }

    #[test]
    fn test_partial_snapshot_defaults() {
        let mut backend = MemoryPersistence::with_contents(&b"{\"documents\": {}}"[..]);
        let (documents, indices) = backend.load().unwrap();
        assert!(documents.is_empty());
        assert!(indices.is_empty());
    }
}
