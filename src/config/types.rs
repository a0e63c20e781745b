//! Core configuration types for stowage

use std::path::{Path, PathBuf};

use crate::codec::Format;
use crate::error::{Error, Result};

/// Default upper bound for a single serialized setting value (8 KiB)
pub const DEFAULT_MAX_SETTING_SIZE: usize = 8 * 1024;

/// Default name of the settings container
pub const DEFAULT_SETTINGS_CONTAINER: &str = "settings";

/// Sub-folder of a scope holding entries
pub const ENTRIES_FOLDER: &str = "entries";

/// Sub-folder of a scope holding settings container files
pub const SETTINGS_FOLDER: &str = "settings";

/// Recognized persistence domains
///
/// Each kind resolves to a folder. The two stores never share it: entries
/// live in its `entries/` sub-folder and a file-backed settings container in
/// `settings/<container>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScopeKind {
    /// Machine-local application data (`dirs::data_local_dir()/<app>`)
    Local,
    /// User application data that may follow the user between machines
    /// (`dirs::data_dir()/<app>`)
    #[default]
    Roaming,
    /// Scratch space under the system temp directory (`temp_dir()/<app>`)
    Temporary,
    /// Explicit folder, used as-is
    Custom(PathBuf),
}

impl ScopeKind {
    /// Resolve this scope to a folder for the given application
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScopeUnavailable`] if the platform has no such folder.
    pub fn resolve(&self, app_name: &str) -> Result<PathBuf> {
        let base = match self {
            ScopeKind::Local => dirs::data_local_dir()
                .ok_or_else(|| Error::ScopeUnavailable("no local data directory".into()))?,
            ScopeKind::Roaming => dirs::data_dir()
                .ok_or_else(|| Error::ScopeUnavailable("no roaming data directory".into()))?,
            ScopeKind::Temporary => std::env::temp_dir(),
            ScopeKind::Custom(path) => return Ok(path.clone()),
        };
        Ok(base.join(app_name))
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: PathBuf) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap_or(&path));
        }
    }
    path
}

/// Configuration for initializing the [`Storage`](crate::Storage) facade
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Application name, used as the folder name inside platform scopes
    pub app_name: String,

    /// Scope holding entries
    pub entry_scope: ScopeKind,

    /// Scope holding the default settings container file
    pub settings_scope: ScopeKind,

    /// Name of the default settings container
    pub settings_container: String,

    /// Persist settings to disk; when false the default container lives in memory
    pub persistent_settings: bool,

    /// Format used by the short-form entry operations
    pub default_format: Format,

    /// Maximum serialized size of one setting value in bytes
    pub max_setting_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            app_name: "app".into(),
            entry_scope: ScopeKind::default(),
            settings_scope: ScopeKind::default(),
            settings_container: DEFAULT_SETTINGS_CONTAINER.into(),
            persistent_settings: true,
            default_format: Format::default(),
            max_setting_size: DEFAULT_MAX_SETTING_SIZE,
        }
    }
}

impl StorageConfig {
    /// Create a new builder for StorageConfig
    ///
    /// # Example
    /// ```rust
    /// use stowage::{Format, ScopeKind, StorageConfig};
    ///
    /// let config = StorageConfig::builder("my-app")
    ///     .entry_scope(ScopeKind::Local)
    ///     .default_format(Format::Json)
    ///     .build();
    /// ```
    pub fn builder(app_name: impl Into<String>) -> StorageConfigBuilder {
        StorageConfigBuilder::new(app_name)
    }

    /// Resolve the folder for entries (`<scope>/entries`)
    ///
    /// # Errors
    ///
    /// Returns an error if the entry scope is unavailable on this platform.
    pub fn entry_dir(&self) -> Result<PathBuf> {
        Ok(self.entry_scope.resolve(&self.app_name)?.join(ENTRIES_FOLDER))
    }

    /// Resolve the folder for settings container files (`<scope>/settings`)
    ///
    /// # Errors
    ///
    /// Returns an error if the settings scope is unavailable on this platform.
    pub fn settings_dir(&self) -> Result<PathBuf> {
        Ok(self.settings_scope.resolve(&self.app_name)?.join(SETTINGS_FOLDER))
    }

    /// Resolve the file backing the default settings container
    ///
    /// # Errors
    ///
    /// Returns an error if the settings scope is unavailable on this platform.
    pub fn settings_path(&self) -> Result<PathBuf> {
        Ok(self.settings_dir()?.join(format!("{}.json", self.settings_container)))
    }

    /// Check that the settings file stays out of the entry folder
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the settings file would be visible
    /// as an entry, or an error if a scope is unavailable.
    pub fn check_separation(&self) -> Result<()> {
        if !self.persistent_settings {
            return Ok(());
        }
        let settings_path = self.settings_path()?;
        if settings_path.starts_with(self.entry_dir()?) {
            return Err(Error::InvalidPath {
                path: settings_path.display().to_string(),
                reason: "settings file must not live inside the entry folder".into(),
            });
        }
        Ok(())
    }
}

/// Builder for creating StorageConfig with a fluent API
#[derive(Debug, Clone)]
pub struct StorageConfigBuilder {
    config: StorageConfig,
}

impl StorageConfigBuilder {
    /// Create a new builder with the required app name
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            config: StorageConfig {
                app_name: app_name.into(),
                ..StorageConfig::default()
            },
        }
    }

    /// Set the scope for entries
    pub fn entry_scope(mut self, scope: ScopeKind) -> Self {
        self.config.entry_scope = scope;
        self
    }

    /// Use an explicit folder as the entry scope; entries go to its
    /// `entries/` sub-folder
    ///
    /// Supports `~` expansion for home directory.
    pub fn entry_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.entry_scope = ScopeKind::Custom(expand_home(path.into()));
        self
    }

    /// Set the scope for the default settings container
    pub fn settings_scope(mut self, scope: ScopeKind) -> Self {
        self.config.settings_scope = scope;
        self
    }

    /// Use an explicit folder as the settings scope; the container file goes
    /// to its `settings/` sub-folder
    ///
    /// Supports `~` expansion for home directory.
    pub fn settings_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.settings_scope = ScopeKind::Custom(expand_home(path.into()));
        self
    }

    /// Use one explicit folder as the scope of both stores
    pub fn base_dir(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        self.entry_dir(path.clone()).settings_dir(path)
    }

    /// Set the name of the default settings container (default: "settings")
    pub fn settings_container(mut self, name: impl Into<String>) -> Self {
        self.config.settings_container = name.into();
        self
    }

    /// Keep the default settings container in memory only
    pub fn in_memory_settings(mut self) -> Self {
        self.config.persistent_settings = false;
        self
    }

    /// Set the format used by short-form entry operations (default: XML)
    pub fn default_format(mut self, format: Format) -> Self {
        self.config.default_format = format;
        self
    }

    /// Set the maximum serialized size of one setting value
    pub fn max_setting_size(mut self, bytes: usize) -> Self {
        self.config.max_setting_size = bytes;
        self
    }

    /// Build the StorageConfig
    pub fn build(self) -> StorageConfig {
        self.config
    }
}
