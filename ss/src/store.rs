//! KvStore trait and its file and in-memory backends

use eyre::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// String-keyed settings storage
///
/// Values are plain strings; structured values go through the JSON helpers.
pub trait KvStore {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a value, returning whether it existed
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// All keys in sorted order
    fn keys(&self) -> Result<Vec<String>>;

    /// Read a JSON-encoded value
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw).context(format!("Failed to decode value for key '{}'", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Write a value as JSON
    fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value).context(format!("Failed to encode value for key '{}'", key))?;
        self.set(key, &raw)
    }
}

/// In-memory store, mainly for tests and ephemeral sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.values.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }
}

/// Store backed by a single JSON object file
///
/// The whole map is held in memory and flushed on every change. Writes go
/// through a temp file in the same directory and an atomic rename, under an
/// exclusive lock on a sibling `.lock` file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    ///
    /// A missing file is an empty store; the file is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "open: called");

        let values = if path.exists() {
            let content = fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).context(format!("Failed to parse {}", path.display()))?
            }
        } else {
            debug!("open: no file yet, starting empty");
            BTreeMap::new()
        };

        info!(path = %path.display(), count = values.len(), "Opened settings store");
        Ok(Self { path, values })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn persist(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).context(format!("Failed to create {}", dir.display()))?;

        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .context("Failed to open lock file")?;
        lock.lock_exclusive().context("Failed to lock settings store")?;

        let content = serde_json::to_string_pretty(&self.values)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).context("Failed to create temp file")?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path)
            .context(format!("Failed to write {}", self.path.display()))?;

        lock.unlock().context("Failed to unlock settings store")?;
        debug!(path = %self.path.display(), count = self.values.len(), "persist: written");
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        debug!(%key, "set: called");
        if self.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        debug!(%key, "remove: called");
        if self.values.remove(key).is_some() {
            self.persist()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }
}
