use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::storage::error::{StorageResult, StorageSystemError};
use crate::storage::provider::KeyValueStore;

/// Filesystem-backed key-value store: every key is one `<key>.json` file
/// under the base directory.
#[derive(Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at `base_path`. The directory is created lazily
    /// on first write.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Create a store and make sure its directory exists.
    pub fn open(base_path: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&base_path)
            .map_err(|e| StorageSystemError::io(e, "create_dir_all", base_path.clone()))?;
        Ok(Self::new(base_path))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Map a key to its file, refusing anything that could escape the base directory.
    fn resolve_key(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageSystemError::InvalidKey {
                key: key.to_string(),
                reason: "keys may only contain ASCII letters, digits, '_', '-' and '.'".to_string(),
            });
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.resolve_key(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageSystemError::io(e, "read", path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.resolve_key(key)?;
        fs::create_dir_all(&self.base_path)
            .map_err(|e| StorageSystemError::io(e, "create_dir_all", self.base_path.clone()))?;

        // Write next to the target, then atomically replace it
        let mut temp_file = NamedTempFile::new_in(&self.base_path)
            .map_err(|e| StorageSystemError::io(e, "create_temp_file", self.base_path.clone()))?;
        temp_file
            .write_all(value.as_bytes())
            .map_err(|e| StorageSystemError::io(e, "write_to_temp_file", temp_file.path().to_path_buf()))?;
        temp_file
            .persist(&path)
            .map_err(|e| StorageSystemError::io(e.error, "persist_temp_file", path.clone()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve_key(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageSystemError::io(e, "remove_file", path)),
        }
    }
}

impl fmt::Debug for FileKeyValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileKeyValueStore")
            .field("base_path", &self.base_path)
            .finish()
    }
}
