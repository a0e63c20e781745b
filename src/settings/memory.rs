//! In-memory settings container

use super::{SettingContainer, check_limits};
use crate::config::DEFAULT_MAX_SETTING_SIZE;
use crate::error::Result;
use crate::sync::RwLockExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Settings container that lives for the current session only
pub struct MemoryContainer {
    name: String,
    values: RwLock<HashMap<String, Value>>,
    max_value_size: usize,
}

impl MemoryContainer {
    /// Create an empty container
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: RwLock::new(HashMap::new()),
            max_value_size: DEFAULT_MAX_SETTING_SIZE,
        }
    }

    /// Set the maximum serialized size of one value
    #[must_use]
    pub fn with_max_value_size(mut self, bytes: usize) -> Self {
        self.max_value_size = bytes;
        self
    }
}

impl Default for MemoryContainer {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl SettingContainer for MemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        check_limits(key, &value, self.max_value_size)?;
        self.values.write_recovered().insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read_recovered().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.values.write_recovered().remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<_> = self.values.read_recovered().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn clear(&self) -> Result<()> {
        self.values.write_recovered().clear();
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
