//! Snapshot persistence.
//!
//! A [`Store`] holds serialized snapshots by key so that a restarted
//! process (or a second process sharing the store) can serve the last
//! fetched list before its own first fetch completes.
//!
//! Values are the JSON form of [`StoredSnapshot`].

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{CountriesError, Result};

/// Default maximum number of keys held by a [`MemoryStore`].
const DEFAULT_MEMORY_STORE_MAX: u64 = 1_000;

/// Backing persistence for polled snapshots.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read the value stored under `key`. Missing keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;
}

/// Persisted form of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSnapshot<T> {
    /// When the snapshot was fetched, in unix milliseconds.
    pub fetched_at: u64,
    pub data: Vec<T>,
}

impl<T> StoredSnapshot<T> {
    /// Wrap `data` stamped with the current time.
    pub fn now(data: Vec<T>) -> Self {
        Self {
            fetched_at: unix_millis(),
            data,
        }
    }
}

/// Current time in unix milliseconds (0 if the clock is before the epoch).
pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store backed by a bounded moka cache.
///
/// Cloning is cheap and clones share the same entries.
#[derive(Clone)]
pub struct MemoryStore {
    entries: moka::sync::Cache<String, String>,
}

impl MemoryStore {
    /// Create a store with the default max capacity (1,000 keys).
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MEMORY_STORE_MAX)
    }

    /// Create a store with a custom max capacity.
    pub fn with_max_entries(max: u64) -> Self {
        Self {
            entries: moka::sync::Cache::new(max),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

// ============================================================================
// File store
// ============================================================================

/// Store writing one `<key>.json` file per key into a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store files under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Default for FileStore {
    /// `~/.cache/countrieslib/`.
    fn default() -> Self {
        Self::new(default_store_dir())
    }
}

fn default_store_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("countrieslib")
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read stored snapshot");
                Err(CountriesError::Store(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        }
    }

    /// Atomic write via tmp + rename.
    async fn set(&self, key: &str, value: String) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            CountriesError::Store(format!(
                "failed to create store dir {}: {e}",
                self.dir.display()
            ))
        })?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        let written = match tokio::fs::write(&tmp_path, value).await {
            Ok(()) => tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
                format!(
                    "failed to rename {} → {}: {e}",
                    tmp_path.display(),
                    path.display()
                )
            }),
            Err(e) => Err(format!("failed to write {}: {e}", tmp_path.display())),
        };
        if let Err(message) = written {
            // The tmp file may not exist if the write failed early.
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(CountriesError::Store(message));
        }

        Ok(())
    }
}
