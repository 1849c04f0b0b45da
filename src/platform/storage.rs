//! Key/blob storage backends
//!
//! Writes are atomic: a reader sees either the old blob or the new one,
//! never a partial write.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid key '{0}'")]
    InvalidKey(String),
}

/// A store of named byte blobs
pub trait BlobStore {
    /// `Ok(None)` when the key has never been written
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    /// Replace the blob in one step
    fn write_atomic(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
    /// Removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write_atomic(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.blobs.remove(key);
        Ok(())
    }
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// The directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let plain = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl BlobStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    fn write_atomic(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(io_err(&self.root))?;

        let tmp_path = self.root.join(format!("{key}.tmp"));
        // rename replaces the destination in one step
        let result = fs::write(&tmp_path, bytes)
            .map_err(io_err(&tmp_path))
            .and_then(|()| fs::rename(&tmp_path, &path).map_err(io_err(&path)));
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&path)(e)),
        }
    }
}

/// Browser LocalStorage; blobs are stored as UTF-8 strings under a prefix
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    prefix: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn storage(&self) -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StorageError::Unavailable("LocalStorage not available".into()))
    }

    fn item_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[cfg(target_arch = "wasm32")]
impl BlobStore for LocalStorageStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let storage = self.storage()?;
        storage
            .get_item(&self.item_key(key))
            .map(|item| item.map(String::into_bytes))
            .map_err(|_| StorageError::Unavailable(format!("getItem failed for '{key}'")))
    }

    fn write_atomic(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| StorageError::Unavailable("LocalStorage only holds text".into()))?;
        self.storage()?
            .set_item(&self.item_key(key), text)
            .map_err(|_| StorageError::Unavailable(format!("setItem failed for '{key}'")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(&self.item_key(key))
            .map_err(|_| StorageError::Unavailable(format!("removeItem failed for '{key}'")))
    }
}
