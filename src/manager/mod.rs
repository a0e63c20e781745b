//! Storage facade
//!
//! This module contains [`Storage`], the primary entry point. It holds one
//! default entry scope and one default settings container. Every short-form
//! operation forwards to the matching explicit-scope form (`*_in`) with those
//! defaults; the explicit forms are associated functions that work on any
//! scope or container.

mod builder;

pub use builder::StorageBuilder;

use crate::codec::Format;
use crate::config::StorageConfig;
use crate::entries::{self, EntryScope};
use crate::error::Result;
use crate::settings::{self, FileContainer, MemoryContainer, SettingContainer};

use log::info;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

/// Save/load/delete facade for entries (files) and settings (key/value)
///
/// All plain operations are fail-soft: saves and deletes return `false` and
/// loads return `T::default()` on any failure. The `try_*` operations return
/// the underlying [`Error`](crate::Error) instead.
///
/// # Example
///
/// ```rust,no_run
/// use stowage::{Format, Storage};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Prefs {
///     count: i32,
/// }
///
/// # async fn example() -> stowage::Result<()> {
/// let storage = Storage::builder("my-app").base_dir("/tmp/my-app").build()?;
///
/// storage.save_entry("prefs.xml", &Prefs { count: 5 }).await;
/// let prefs: Prefs = storage.load_entry("prefs.xml").await;
///
/// storage.save_setting("theme", "dark");
/// let theme: String = storage.load_setting("theme");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Storage {
    entry_scope: EntryScope,
    settings: Arc<dyn SettingContainer>,
    default_format: Format,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("entry_scope", &self.entry_scope)
            .field("settings", &self.settings.name())
            .field("default_format", &self.default_format)
            .finish()
    }
}

impl Storage {
    /// Create a storage facade from a configuration
    ///
    /// Scopes are resolved here; folders and files are created lazily on the
    /// first write.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured scope is unavailable on this platform,
    /// or if the settings file would land inside the entry folder.
    pub fn new(config: StorageConfig) -> Result<Self> {
        config.check_separation()?;
        let entry_scope = EntryScope::new(config.entry_dir()?);

        let settings: Arc<dyn SettingContainer> = if config.persistent_settings {
            let path = config.settings_path()?;
            Arc::new(
                FileContainer::at_path(path, config.settings_container.clone())
                    .with_max_value_size(config.max_setting_size),
            )
        } else {
            Arc::new(
                MemoryContainer::new(config.settings_container.clone())
                    .with_max_value_size(config.max_setting_size),
            )
        };

        info!(
            "Storage for '{}' ready: entries in {}, settings container '{}'",
            config.app_name,
            entry_scope.root().display(),
            settings.name()
        );

        Ok(Self::from_parts(entry_scope, settings, config.default_format))
    }

    /// Create a storage facade from explicit defaults
    pub fn from_parts(
        entry_scope: EntryScope,
        settings: Arc<dyn SettingContainer>,
        default_format: Format,
    ) -> Self {
        Self {
            entry_scope,
            settings,
            default_format,
        }
    }

    /// Create a new builder
    pub fn builder(app_name: impl Into<String>) -> StorageBuilder {
        StorageBuilder::new(app_name)
    }

    /// Default entry scope
    #[must_use]
    pub fn entry_scope(&self) -> &EntryScope {
        &self.entry_scope
    }

    /// Default settings container
    #[must_use]
    pub fn settings(&self) -> &Arc<dyn SettingContainer> {
        &self.settings
    }

    /// Format used by short-form entry operations
    #[must_use]
    pub fn default_format(&self) -> Format {
        self.default_format
    }

    // =========================================================================
    // Entries: explicit scope
    // =========================================================================

    /// Save `value` under `path` in `scope`
    pub async fn save_entry_in<T: Serialize>(
        scope: &EntryScope,
        path: &str,
        value: &T,
        format: Format,
    ) -> bool {
        entries::save(scope, path, value, format).await
    }

    /// Load the entry at `path` in `scope`, or `T::default()` if unavailable
    pub async fn load_entry_in<T>(scope: &EntryScope, path: &str, format: Format) -> T
    where
        T: DeserializeOwned + Default,
    {
        entries::load(scope, path, format).await
    }

    /// Delete the entry at `path` in `scope`
    pub async fn delete_entry_in(scope: &EntryScope, path: &str) -> bool {
        entries::delete(scope, path).await
    }

    // =========================================================================
    // Entries: default scope
    // =========================================================================

    /// Save `value` under `path` using the default format
    pub async fn save_entry<T: Serialize>(&self, path: &str, value: &T) -> bool {
        self.save_entry_as(path, value, self.default_format).await
    }

    /// Save `value` under `path` using `format`
    pub async fn save_entry_as<T: Serialize>(&self, path: &str, value: &T, format: Format) -> bool {
        Self::save_entry_in(&self.entry_scope, path, value, format).await
    }

    /// Load the entry at `path` using the default format
    pub async fn load_entry<T>(&self, path: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.load_entry_as(path, self.default_format).await
    }

    /// Load the entry at `path` using `format`
    pub async fn load_entry_as<T>(&self, path: &str, format: Format) -> T
    where
        T: DeserializeOwned + Default,
    {
        Self::load_entry_in(&self.entry_scope, path, format).await
    }

    /// Load the entry at `path`, or `None` if it is missing or unreadable
    pub async fn load_entry_opt<T: DeserializeOwned>(&self, path: &str, format: Format) -> Option<T> {
        entries::load_opt(&self.entry_scope, path, format).await
    }

    /// Delete the entry at `path`
    pub async fn delete_entry(&self, path: &str) -> bool {
        Self::delete_entry_in(&self.entry_scope, path).await
    }

    /// Check whether an entry exists at `path`
    pub async fn entry_exists(&self, path: &str) -> bool {
        entries::exists(&self.entry_scope, path).await
    }

    /// List all entries in the default scope
    pub async fn list_entries(&self) -> Vec<String> {
        entries::list(&self.entry_scope).await
    }

    /// Save `value` under `path`, returning the underlying error on failure
    ///
    /// # Errors
    ///
    /// Returns a codec, resolution or I/O error.
    pub async fn try_save_entry<T: Serialize>(&self, path: &str, value: &T, format: Format) -> Result<()> {
        entries::try_save(&self.entry_scope, path, value, format).await
    }

    /// Load the entry at `path`; `Ok(None)` if it does not exist
    ///
    /// # Errors
    ///
    /// Returns a codec, resolution or I/O error.
    pub async fn try_load_entry<T: DeserializeOwned>(&self, path: &str, format: Format) -> Result<Option<T>> {
        entries::try_load(&self.entry_scope, path, format).await
    }

    /// Delete the entry at `path`, returning the underlying error on failure
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`](crate::Error::EntryNotFound) or an I/O error.
    pub async fn try_delete_entry(&self, path: &str) -> Result<()> {
        entries::try_delete(&self.entry_scope, path).await
    }

    // =========================================================================
    // Settings: explicit container
    // =========================================================================

    /// Save `value` under `key` in `container`
    pub fn save_setting_in<T>(container: &dyn SettingContainer, key: &str, value: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        settings::save_setting(container, key, value)
    }

    /// Load the value under `key` in `container`, or `T::default()` if unavailable
    pub fn load_setting_in<T>(container: &dyn SettingContainer, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        settings::load_setting(container, key)
    }

    /// Delete `key` from `container`
    pub fn delete_setting_in(container: &dyn SettingContainer, key: &str) -> bool {
        settings::delete_setting(container, key)
    }

    // =========================================================================
    // Settings: default container
    // =========================================================================

    /// Save `value` under `key`
    pub fn save_setting<T>(&self, key: &str, value: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        Self::save_setting_in(self.settings.as_ref(), key, value)
    }

    /// Load the value under `key`, or `T::default()` if absent or of another type
    pub fn load_setting<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        Self::load_setting_in(self.settings.as_ref(), key)
    }

    /// Load the value under `key`, or `None` if absent or of another type
    pub fn load_setting_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        settings::load_setting_opt(self.settings.as_ref(), key)
    }

    /// Delete `key`
    pub fn delete_setting(&self, key: &str) -> bool {
        Self::delete_setting_in(self.settings.as_ref(), key)
    }

    /// Save `value` under `key`, returning the underlying error on failure
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetting`](crate::Error::InvalidSetting) or a container error.
    pub fn try_save_setting<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        settings::try_save_setting(self.settings.as_ref(), key, value)
    }

    /// Load the value under `key`; `Ok(None)` if absent
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`](crate::Error::Codec) on a type mismatch or a container error.
    pub fn try_load_setting<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        settings::try_load_setting(self.settings.as_ref(), key)
    }

    /// Delete `key`, returning the underlying error on failure
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingNotFound`](crate::Error::SettingNotFound) or a container error.
    pub fn try_delete_setting(&self, key: &str) -> Result<()> {
        settings::try_delete_setting(self.settings.as_ref(), key)
    }
}
