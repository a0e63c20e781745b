//! Configuration types
//!
//! - `StorageConfig` - Default scopes and format for the storage facade
//! - `ScopeKind` - The recognized persistence domains

mod types;

pub use types::{
    DEFAULT_MAX_SETTING_SIZE, DEFAULT_SETTINGS_CONTAINER, ENTRIES_FOLDER, SETTINGS_FOLDER,
    ScopeKind, StorageConfig, StorageConfigBuilder,
};
