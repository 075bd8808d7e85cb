//! Persistence for the welcome-shown flag.
//!
//! The flag records, across process restarts, whether the introductory
//! greeting (and its spoken playback) has already happened. It is kept
//! behind a small store trait so the session can be tested without
//! touching the filesystem.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persisted boolean flag for the welcome greeting.
pub trait WelcomeStore: Send + Sync {
    /// Whether the greeting was already shown.
    fn is_set(&self) -> Result<bool, StoreError>;

    /// Record that the greeting has been shown.
    fn set(&mut self) -> Result<(), StoreError>;

    /// Forget that the greeting was shown.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// File-backed flag: a marker file under the state directory.
#[derive(Debug, Clone)]
pub struct FileWelcomeStore {
    path: PathBuf,
}

impl FileWelcomeStore {
    /// Store the flag at `path`. Nothing is created until `set`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WelcomeStore for FileWelcomeStore {
    fn is_set(&self) -> Result<bool, StoreError> {
        Ok(self.path.exists())
    }

    fn set(&mut self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        atomic_write(&self.path, b"1")?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory flag for tests and ephemeral sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryWelcomeStore {
    set: bool,
}

impl MemoryWelcomeStore {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WelcomeStore for MemoryWelcomeStore {
    fn is_set(&self) -> Result<bool, StoreError> {
        Ok(self.set)
    }

    fn set(&mut self) -> Result<(), StoreError> {
        self.set = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.set = false;
        Ok(())
    }
}

/// Write content atomically using temp file + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Generate unique temp filename using timestamp and process ID
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let pid = std::process::id();

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let temp_name = format!(".{file_name}.{timestamp}.{pid}.tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file = File::create(&temp_path)?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_lifecycle() {
        let mut store = MemoryWelcomeStore::new();
        assert!(!store.is_set().unwrap());

        store.set().unwrap();
        assert!(store.is_set().unwrap());

        store.clear().unwrap();
        assert!(!store.is_set().unwrap());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("state").join("welcome_shown");

        let mut store = FileWelcomeStore::new(&path);
        assert!(!store.is_set().unwrap());

        store.set().unwrap();
        assert!(store.is_set().unwrap());

        // A fresh instance sees the persisted flag.
        let other = FileWelcomeStore::new(&path);
        assert!(other.is_set().unwrap());

        store.clear().unwrap();
        assert!(!store.is_set().unwrap());
        assert!(!other.is_set().unwrap());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = FileWelcomeStore::new(dir.path().join("welcome_shown"));

        store.clear().unwrap();
        store.set().unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.is_set().unwrap());
    }
}
