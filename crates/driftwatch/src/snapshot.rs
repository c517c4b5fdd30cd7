//! Snapshot persistence
//!
//! Stores the last materialized [`DocumentMap`] per table as an opaque
//! JSON blob. A missing snapshot is a valid state: the first run over a
//! table saves a baseline and reports nothing. Saves are unconditional
//! overwrites — there is no merge or partial update.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::DocumentMap;
use crate::error::{Error, Result};

/// A named blob store for per-table snapshots.
///
/// Distinct tables map to distinct keys/paths and never interfere.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last snapshot for a table. `None` = first encounter.
    async fn load(&self, table: &str) -> Result<Option<DocumentMap>>;

    /// Overwrite the snapshot for a table
    async fn save(&self, table: &str, documents: &DocumentMap) -> Result<()>;

    /// Whether a snapshot exists for a table
    async fn exists(&self, table: &str) -> Result<bool> {
        Ok(self.load(table).await?.is_some())
    }

    /// Remove a table's snapshot (forces a re-baseline on the next run)
    async fn delete(&self, table: &str) -> Result<()>;
}

/// In-memory snapshot store for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    inner: RwLock<HashMap<String, DocumentMap>>,
}

impl MemorySnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, table: &str) -> Result<Option<DocumentMap>> {
        Ok(self.inner.read().await.get(table).cloned())
    }

    async fn save(&self, table: &str, documents: &DocumentMap) -> Result<()> {
        self.inner
            .write()
            .await
            .insert(table.to_string(), documents.clone());
        Ok(())
    }

    async fn exists(&self, table: &str) -> Result<bool> {
        Ok(self.inner.read().await.contains_key(table))
    }

    async fn delete(&self, table: &str) -> Result<()> {
        self.inner.write().await.remove(table);
        Ok(())
    }
}

/// File-based snapshot store: one JSON file per table under a directory.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-save never leaves a corrupt snapshot behind.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::snapshot(format!("failed to create snapshot directory: {e}")))?;
        Ok(Self { dir })
    }

    /// The directory snapshots are stored under
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn file_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.snapshot.json"))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, table: &str) -> Result<Option<DocumentMap>> {
        let path = self.file_path(table);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::snapshot(format!(
                    "failed to read snapshot {path:?}: {e}"
                )))
            }
        };

        let documents = serde_json::from_str(&content)
            .map_err(|e| Error::snapshot(format!("failed to parse snapshot {path:?}: {e}")))?;
        Ok(Some(documents))
    }

    async fn save(&self, table: &str, documents: &DocumentMap) -> Result<()> {
        let path = self.file_path(table);
        let content = serde_json::to_string(documents)?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .await
            .map_err(|e| Error::snapshot(format!("failed to write snapshot: {e}")))?;
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| Error::snapshot(format!("failed to rename snapshot: {e}")))?;

        debug!(table, documents = documents.len(), "saved snapshot");
        Ok(())
    }

    async fn exists(&self, table: &str) -> Result<bool> {
        Ok(fs::try_exists(self.file_path(table))
            .await
            .unwrap_or(false))
    }

    async fn delete(&self, table: &str) -> Result<()> {
        let path = self.file_path(table);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::snapshot(format!(
                "failed to delete snapshot {path:?}: {e}"
            ))),
        }
    }
}
