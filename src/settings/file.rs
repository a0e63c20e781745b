//! JSON file-backed settings container
//!
//! The whole container is one JSON object on disk. It is read lazily on first
//! access, cached, and written through on every mutation. Each write goes to
//! its own uniquely named temp file that is synced and renamed over the
//! target, so concurrent writers never leave the file half written.

use super::{SettingContainer, check_limits};
use crate::config::DEFAULT_MAX_SETTING_SIZE;
use crate::entries::temp_path_for;
use crate::error::{Error, Result};
use crate::sync::RwLockExt;
use log::{debug, info};
use serde_json::{Map, Value};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

type Values = Map<String, Value>;

fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

/// Settings container persisted as `<dir>/<name>.json`
pub struct FileContainer {
    name: String,
    path: PathBuf,
    cache: RwLock<Option<Values>>,
    max_value_size: usize,
}

impl FileContainer {
    /// Open the container `name` inside `dir`
    ///
    /// Nothing is read or created until the first operation.
    pub fn open(dir: impl AsRef<Path>, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = dir.as_ref().join(format!("{name}.json"));
        Self::at_path(path, name)
    }

    /// Open a container backed by an explicit file
    pub fn at_path(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            cache: RwLock::new(None),
            max_value_size: DEFAULT_MAX_SETTING_SIZE,
        }
    }

    /// Set the maximum serialized size of one value
    #[must_use]
    pub fn with_max_value_size(mut self, bytes: usize) -> Self {
        self.max_value_size = bytes;
        self
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop the cached values so the next access re-reads the file
    ///
    /// Call this if the file was modified externally.
    pub fn reload(&self) {
        *self.cache.write_recovered() = None;
        debug!("Settings container '{}' cache invalidated", self.name);
    }

    fn read_file(&self) -> Result<Values> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Values::new()),
            Err(e) => {
                return Err(Error::FileRead {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Values::new());
        }
        serde_json::from_slice(&content).map_err(Error::from)
    }

    fn write_file(&self, values: &Values) -> Result<()> {
        let content = serde_json::to_vec_pretty(values)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let temp_path = temp_path_for(&self.path)?;
        if let Err(e) = write_and_sync(&temp_path, &content) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(Error::FileWrite {
                path: temp_path,
                source: e,
            });
        }

        std::fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            Error::FileWrite {
                path: self.path.clone(),
                source: e,
            }
        })
    }

    fn with_values<R>(&self, f: impl FnOnce(&Values) -> R) -> Result<R> {
        if let Some(values) = self.cache.read_recovered().as_ref() {
            return Ok(f(values));
        }

        let mut cache = self.cache.write_recovered();
        if cache.is_none() {
            *cache = Some(self.read_file()?);
            info!("Loaded settings container '{}' from {}", self.name, self.path.display());
        }
        Ok(f(cache.as_ref().unwrap_or(&Values::new())))
    }

    /// Apply `f` to a copy of the values, persist it, then publish it
    fn update<R>(&self, f: impl FnOnce(&mut Values) -> R) -> Result<R> {
        let mut cache = self.cache.write_recovered();
        let mut values = match cache.as_ref() {
            Some(values) => values.clone(),
            None => self.read_file()?,
        };

        let result = f(&mut values);
        self.write_file(&values)?;
        *cache = Some(values);
        Ok(result)
    }
}

impl SettingContainer for FileContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        check_limits(key, &value, self.max_value_size)?;
        self.update(|values| {
            values.insert(key.to_string(), value);
        })
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.with_values(|values| values.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        if !self.contains(key)? {
            return Ok(false);
        }
        self.update(|values| values.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.with_values(|values| values.keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        let mut cache = self.cache.write_recovered();
        let empty = Values::new();
        self.write_file(&empty)?;
        *cache = Some(empty);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
