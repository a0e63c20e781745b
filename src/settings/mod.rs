//! Setting store: typed values addressed by a flat key inside a container
//!
//! Containers keep values in their native model, a [`serde_json::Value`].
//! The typed functions convert to and from that model and, like the entry
//! store, come as `try_*` (returning [`Result`]) and fail-soft variants.
//!
//! Both `MemoryContainer` and `FileContainer` enforce the same limits: keys
//! must be non-empty and at most [`MAX_KEY_LENGTH`] characters, and a value's
//! serialized size must not exceed the container's `max_value_size`.

mod file;
mod memory;

pub use file::FileContainer;
pub use memory::MemoryContainer;

use crate::error::{Error, Result};
use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Longest accepted setting key, in characters
pub const MAX_KEY_LENGTH: usize = 255;

/// Trait for settings container implementations
pub trait SettingContainer: Send + Sync {
    /// Container name for logging/debugging
    fn name(&self) -> &str;

    /// Assign a value to a key, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetting`] if the container rejects the key or
    /// value, or an I/O error from a persistent container.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Look up the value stored under a key
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be read.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Remove a key, returning whether it was present
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be updated.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Check if a key is present
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be read.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// List all stored keys
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be read.
    fn keys(&self) -> Result<Vec<String>>;

    /// Remove every key
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be updated.
    fn clear(&self) -> Result<()>;
}

/// Check a key/value pair against the container limits
pub(crate) fn check_limits(key: &str, value: &Value, max_value_size: usize) -> Result<()> {
    let reject = |reason: String| Error::InvalidSetting {
        key: key.to_string(),
        reason,
    };

    if key.is_empty() {
        return Err(reject("key is empty".into()));
    }
    let key_len = key.chars().count();
    if key_len > MAX_KEY_LENGTH {
        return Err(reject(format!(
            "key is {key_len} characters, limit is {MAX_KEY_LENGTH}"
        )));
    }

    let size = serde_json::to_vec(value)?.len();
    if size > max_value_size {
        return Err(reject(format!(
            "value is {size} bytes, limit is {max_value_size}"
        )));
    }
    Ok(())
}

// =============================================================================
// Typed operations
// =============================================================================

/// Store `value` under `key`
///
/// # Errors
///
/// Returns [`Error::InvalidSetting`] if the value cannot be represented or is
/// rejected by the container, or an error from the container itself.
pub fn try_save_setting<T>(container: &dyn SettingContainer, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value).map_err(|e| Error::InvalidSetting {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    container.set(key, value)?;
    debug!("Saved setting '{key}' in '{}'", container.name());
    Ok(())
}

/// Read the value under `key` as `T`
///
/// Returns `Ok(None)` if the key is absent or holds null.
///
/// # Errors
///
/// Returns [`Error::Codec`] if the stored value cannot be viewed as `T`, or
/// an error from the container itself.
pub fn try_load_setting<T>(container: &dyn SettingContainer, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match container.get(key)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| Error::codec("setting", e)),
    }
}

/// Remove `key` from the container
///
/// # Errors
///
/// Returns [`Error::SettingNotFound`] if the key is absent, or an error from
/// the container itself.
pub fn try_delete_setting(container: &dyn SettingContainer, key: &str) -> Result<()> {
    if container.remove(key)? {
        debug!("Deleted setting '{key}' from '{}'", container.name());
        Ok(())
    } else {
        Err(Error::SettingNotFound(key.to_string()))
    }
}

/// Store `value` under `key`, reporting success as a bool
pub fn save_setting<T>(container: &dyn SettingContainer, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
{
    match try_save_setting(container, key, value) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save setting '{key}': {e}");
            false
        }
    }
}

/// Read the value under `key`, or `None` if it is absent, mismatched or unreadable
pub fn load_setting_opt<T>(container: &dyn SettingContainer, key: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    match try_load_setting(container, key) {
        Ok(value) => value,
        Err(e) => {
            debug!("Setting '{key}' unavailable: {e}");
            None
        }
    }
}

/// Read the value under `key`, or `T::default()` if it is absent, mismatched or unreadable
pub fn load_setting<T>(container: &dyn SettingContainer, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    load_setting_opt(container, key).unwrap_or_default()
}

/// Remove `key`, reporting success as a bool
///
/// Deleting a key that is not present reports `false`, matching entry deletes.
pub fn delete_setting(container: &dyn SettingContainer, key: &str) -> bool {
    match try_delete_setting(container, key) {
        Ok(()) => true,
        Err(e) if e.is_not_found() => {
            debug!("Cannot delete setting '{key}': not found");
            false
        }
        Err(e) => {
            warn!("Failed to delete setting '{key}': {e}");
            false
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Window {
        width: u32,
        height: u32,
    }

    #[test]
    fn test_setting_roundtrip() {
        let container = MemoryContainer::new("test");

        assert!(save_setting(&container, "theme", "dark"));
        assert_eq!(load_setting::<String>(&container, "theme"), "dark");
    }

    #[test]
    fn test_type_mismatch_is_default() {
        let container = MemoryContainer::new("test");

        assert!(save_setting(&container, "theme", "dark"));
        assert_eq!(load_setting::<i32>(&container, "theme"), 0);

        let err = try_load_setting::<i32>(&container, "theme").unwrap_err();
        assert!(matches!(err, Error::Codec { .. }));
    }

    #[test]
    fn test_composite_value() {
        let container = MemoryContainer::new("test");
        let window = Window {
            width: 800,
            height: 600,
        };

        assert!(save_setting(&container, "window", &window));
        assert_eq!(load_setting::<Window>(&container, "window"), window);
    }

    #[test]
    fn test_null_is_absent() {
        let container = MemoryContainer::new("test");
        container.set("gone", Value::Null).unwrap();

        assert_eq!(try_load_setting::<String>(&container, "gone").unwrap(), None);
        assert_eq!(load_setting::<u8>(&container, "gone"), 0);
    }

    #[test]
    fn test_delete_missing_reports_false() {
        let container = MemoryContainer::new("test");

        assert!(!delete_setting(&container, "never"));
        assert!(try_delete_setting(&container, "never").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_existing() {
        let container = MemoryContainer::new("test");
        save_setting(&container, "count", &3);

        assert!(delete_setting(&container, "count"));
        assert_eq!(load_setting::<i32>(&container, "count"), 0);
    }

    #[test]
    fn test_limits_reject_empty_key() {
        let err = check_limits("", &json!(1), 100).unwrap_err();
        assert!(matches!(err, Error::InvalidSetting { .. }));
    }

    #[test]
    fn test_limits_reject_long_key() {
        let key = "k".repeat(MAX_KEY_LENGTH + 1);
        assert!(check_limits(&key, &json!(1), 100).is_err());
        assert!(check_limits(&key[..MAX_KEY_LENGTH], &json!(1), 100).is_ok());
    }

    #[test]
    fn test_limits_reject_large_value() {
        let value = json!("x".repeat(64));
        assert!(check_limits("big", &value, 32).is_err());
        assert!(check_limits("big", &value, 1024).is_ok());
    }

    #[test]
    fn test_unrepresentable_value_rejected() {
        use std::collections::HashMap;

        let container = MemoryContainer::new("test");
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys have no JSON form");

        assert!(!save_setting(&container, "map", &map));
        assert!(!container.contains("map").unwrap());
    }
}
