//! Storage backends for the response cache.
//!
//! Backends deal in opaque storage ids (already hashed) and raw bytes.
//! Encoding, hashing and TTL logic live in [`ResponseCache`](crate::ResponseCache).

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::Result;

/// Byte-level storage used by the response cache.
pub trait CacheBackend: Send + Sync + std::fmt::Debug {
    /// Read the bytes stored under `id`, or `None` if absent.
    fn read(&self, id: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the bytes stored under `id`. Readers must never observe a
    /// partially written value.
    fn write(&self, id: &str, bytes: &[u8]) -> Result<()>;

    /// Remove the value stored under `id`. Absent ids are not an error.
    fn remove(&self, id: &str) -> Result<()>;

    /// Remove every stored value. An empty store is not an error.
    fn clear(&self) -> Result<()>;
}

// ============================================================================
// FileBackend
// ============================================================================

/// One JSON file per entry inside a dedicated directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the cache files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }
}

impl CacheBackend for FileBackend {
    fn read(&self, id: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.ensure_dir()?;

        // Same directory as the target so the rename stays on one filesystem.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.persist(self.path_for(id)).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove entry files and leftover temp files. Anything else in the
    /// directory is left alone.
    fn clear(&self) -> Result<()> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !is_owned_file(name) || !entry.file_type()?.is_file() {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// `<sha256 hex>.json` entries and `.tmp*` files left by an interrupted write.
fn is_owned_file(name: &str) -> bool {
    if name.starts_with(".tmp") {
        return true;
    }
    name.strip_suffix(".json").is_some_and(|stem| {
        stem.len() == 64 && stem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    })
}

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-process backend for tests and for running without a cache directory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheBackend for MemoryBackend {
    fn read(&self, id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(id).cloned())
    }

    fn write(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.entries.write().insert(id.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.entries.write().remove(id);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}
