use crate::constants::paths;
use crate::error::{ChatError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Raw key/value store the [`Storage`] adapter sits on.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    /// Erase every entry owned by this backend.
    fn clear(&self) -> Result<()>;
}

/// One `<key>.json` file per entry inside a single data directory.
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    /// Backend rooted at the default data directory (`<data_dir>/pollenchat/`).
    pub fn new() -> Result<Self> {
        let base_dir = Self::default_dir()?;
        Self::with_dir(base_dir)
    }

    /// Backend rooted at a custom directory (useful for testing).
    pub fn with_dir(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|e| {
            ChatError::Config(format!(
                "Failed to create data directory {}: {}",
                base_dir.display(),
                e
            ))
        })?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> Result<PathBuf> {
        let data = dirs::data_dir().ok_or_else(|| {
            ChatError::Config("Could not determine data directory".to_string())
        })?;
        Ok(data.join(paths::DATA_DIR))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

/// In-process backend; nothing survives the process.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ChatError::Other("memory storage lock poisoned".into()))
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries()?.clear();
        Ok(())
    }
}

/// JSON persistence over a [`StorageBackend`].
///
/// Nothing here returns an error: a failed write is logged and dropped, a
/// failed or unparsable read yields the caller's default. The persisted
/// transcript is a cache, so losing it must never take the session down.
pub struct Storage {
    backend: Box<dyn StorageBackend>,
}

impl Storage {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize storage entry");
                return;
            }
        };
        if let Err(e) = self.backend.write(key, &encoded) {
            tracing::warn!(key, error = %e, "failed to write storage entry");
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.read(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key, error = %e, "failed to parse storage entry, using default");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read storage entry, using default");
                default
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            tracing::warn!(key, error = %e, "failed to remove storage entry");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.backend.clear() {
            tracing::warn!(error = %e, "failed to clear storage");
        }
    }
}
