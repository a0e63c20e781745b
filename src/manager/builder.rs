//! Builder for Storage
//!
//! This module contains [`StorageBuilder`] which provides a fluent API
//! for creating a [`Storage`](super::Storage).

use crate::codec::Format;
use crate::config::{ScopeKind, StorageConfigBuilder};
use crate::entries::EntryScope;
use crate::error::Result;
use crate::settings::SettingContainer;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::Storage;

/// Builder for creating a [`Storage`] with a fluent API.
///
/// # Example
///
/// ```rust,no_run
/// use stowage::{Format, ScopeKind, Storage};
///
/// let storage = Storage::builder("my-app")
///     .entry_scope(ScopeKind::Local)
///     .settings_scope(ScopeKind::Roaming)
///     .default_format(Format::Json)
///     .build()
///     .unwrap();
/// ```
pub struct StorageBuilder {
    config_builder: StorageConfigBuilder,
    settings: Option<Arc<dyn SettingContainer>>,
}

impl StorageBuilder {
    /// Create a new builder with the required app name.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            config_builder: StorageConfigBuilder::new(app_name),
            settings: None,
        }
    }

    /// Set the scope for entries.
    pub fn entry_scope(mut self, scope: ScopeKind) -> Self {
        self.config_builder = self.config_builder.entry_scope(scope);
        self
    }

    /// Use an explicit folder as the entry scope; entries go to its
    /// `entries/` sub-folder.
    ///
    /// Supports `~` expansion for home directory.
    pub fn entry_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.entry_dir(path);
        self
    }

    /// Set the scope for the default settings container.
    pub fn settings_scope(mut self, scope: ScopeKind) -> Self {
        self.config_builder = self.config_builder.settings_scope(scope);
        self
    }

    /// Use an explicit folder as the settings scope; the container file goes
    /// to its `settings/` sub-folder.
    pub fn settings_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.settings_dir(path);
        self
    }

    /// Use one explicit folder as the scope of both stores.
    pub fn base_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config_builder = self.config_builder.base_dir(path);
        self
    }

    /// Set the name of the default settings container (default: "settings").
    pub fn settings_container(mut self, name: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.settings_container(name);
        self
    }

    /// Keep the default settings container in memory only.
    pub fn in_memory_settings(mut self) -> Self {
        self.config_builder = self.config_builder.in_memory_settings();
        self
    }

    /// Use a caller-provided container as the default settings container.
    ///
    /// Overrides the settings scope, container name and size limit.
    pub fn with_settings(mut self, container: Arc<dyn SettingContainer>) -> Self {
        self.settings = Some(container);
        self
    }

    /// Set the format used by short-form entry operations (default: XML).
    pub fn default_format(mut self, format: Format) -> Self {
        self.config_builder = self.config_builder.default_format(format);
        self
    }

    /// Set the maximum serialized size of one setting value.
    pub fn max_setting_size(mut self, bytes: usize) -> Self {
        self.config_builder = self.config_builder.max_setting_size(bytes);
        self
    }

    /// Build the [`Storage`].
    ///
    /// # Errors
    ///
    /// Returns an error if a configured scope is unavailable on this platform,
    /// or if the settings file would land inside the entry folder.
    pub fn build(self) -> Result<Storage> {
        let config = self.config_builder.build();
        match self.settings {
            Some(settings) => Ok(Storage::from_parts(
                EntryScope::new(config.entry_dir()?),
                settings,
                config.default_format,
            )),
            None => Storage::new(config),
        }
    }
}
