//! Common test utilities for stowage integration tests
//!
//! Provides shared test fixtures, data types, and helper functions.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stowage::config::{ENTRIES_FOLDER, SETTINGS_FOLDER};
use stowage::{Storage, StorageConfig};
use tempfile::TempDir;

// =============================================================================
// Test Data Types
// =============================================================================

/// The `{count: int}` shape used throughout the scenarios
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Prefs {
    pub count: i32,
}

/// A richer object covering nested structs, sequences and scalar types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub enabled: bool,
    pub tags: Vec<String>,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiSettings {
    pub theme: String,
    pub font_size: f64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            font_size: 14.0,
        }
    }
}

/// A shape no other test type can be decoded into
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Unrelated {
    pub label: String,
    pub weight: f64,
}

/// Optional fields and a possibly empty list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Draft {
    pub title: String,
    pub note: Option<String>,
    pub rating: Option<i32>,
    pub tags: Vec<String>,
}

pub fn sample_profile() -> Profile {
    Profile {
        name: "Ada & <Co>".to_string(),
        age: 36,
        enabled: true,
        tags: vec!["admin".to_string(), "beta".to_string()],
        ui: UiSettings {
            theme: "light".to_string(),
            font_size: 12.5,
        },
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// Test fixture that provides a temporary directory and a configured Storage
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub storage: Storage,
}

impl TestFixture {
    /// Create a fixture with entries and a file-backed settings container
    /// sharing one temporary scope folder
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = Storage::builder("test-app")
            .base_dir(temp_dir.path())
            .build()
            .expect("Failed to create storage");

        Self::prepared(temp_dir, storage)
    }

    /// Create a fixture whose default settings container lives in memory
    pub fn in_memory_settings() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = StorageConfig::builder("test-app")
            .base_dir(temp_dir.path())
            .in_memory_settings()
            .build();
        let storage = Storage::new(config).expect("Failed to create storage");

        Self::prepared(temp_dir, storage)
    }

    /// Create the store folders so tests can plant files before the first save
    fn prepared(temp_dir: TempDir, storage: Storage) -> Self {
        for folder in [ENTRIES_FOLDER, SETTINGS_FOLDER] {
            std::fs::create_dir_all(temp_dir.path().join(folder))
                .expect("Failed to create store folder");
        }
        Self { temp_dir, storage }
    }

    /// Build a second Storage over the same directory
    pub fn reopen(&self) -> Storage {
        Storage::builder("test-app")
            .base_dir(self.temp_dir.path())
            .build()
            .expect("Failed to reopen storage")
    }

    /// Absolute path of an entry
    pub fn entry_path(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(ENTRIES_FOLDER).join(path)
    }

    /// Path of the default settings container file
    pub fn settings_path(&self) -> PathBuf {
        self.temp_dir.path().join(SETTINGS_FOLDER).join("settings.json")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Read the raw settings JSON file content
pub fn read_settings_file(fixture: &TestFixture) -> Option<serde_json::Value> {
    let content = std::fs::read_to_string(fixture.settings_path()).ok()?;
    serde_json::from_str(&content).ok()
}

/// Read an entry file as text
pub fn read_entry_text(fixture: &TestFixture, path: &str) -> Option<String> {
    std::fs::read_to_string(fixture.entry_path(path)).ok()
}

/// Install a test logger once; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
