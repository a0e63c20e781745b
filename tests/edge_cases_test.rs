//! Edge Cases Integration Tests
//!
//! Tests for edge cases, error conditions, and boundary behaviors:
//! - Empty payload short circuit
//! - Corrupted and empty files
//! - Concurrent writers to the same path or key
//! - Custom codecs

mod common;

use common::{Prefs, TestFixture, init_logging};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::thread;
use stowage::entries;
use stowage::{Codec, ErrorKind, Format, JsonCodec, Result, Storage};

/// Codec that produces nothing, as a format with no representation for a value would
struct SilentCodec;

impl Codec for SilentCodec {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn encode<T: Serialize>(&self, _value: &T) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        JsonCodec::new().decode(bytes)
    }
}

// =============================================================================
// Empty Payload
// =============================================================================

#[tokio::test]
async fn test_empty_payload_reports_success_without_file() {
    let fixture = TestFixture::new();
    let scope = fixture.storage.entry_scope();

    assert!(entries::save_with(scope, "silent.txt", &Prefs { count: 1 }, &SilentCodec).await);
    assert!(!fixture.entry_path("silent.txt").exists());
}

#[tokio::test]
async fn test_empty_payload_does_not_modify_existing_file() {
    let fixture = TestFixture::new();
    let scope = fixture.storage.entry_scope();

    fixture
        .storage
        .save_entry_as("silent.txt", &Prefs { count: 4 }, Format::Json)
        .await;
    assert!(entries::save_with(scope, "silent.txt", &Prefs { count: 8 }, &SilentCodec).await);

    let loaded: Prefs = entries::load_with(scope, "silent.txt", &SilentCodec).await;
    assert_eq!(loaded.count, 4);
}

// =============================================================================
// Corrupted Files
// =============================================================================

#[tokio::test]
async fn test_corrupt_entry_is_default() {
    init_logging();
    let fixture = TestFixture::new();
    std::fs::write(fixture.entry_path("prefs.xml"), "<Prefs><count>five</count>").unwrap();

    let loaded: Prefs = fixture.storage.load_entry("prefs.xml").await;
    assert_eq!(loaded, Prefs::default());

    let err = fixture
        .storage
        .try_load_entry::<Prefs>("prefs.xml", Format::Xml)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Codec);
}

#[tokio::test]
async fn test_empty_entry_file_is_not_found() {
    let fixture = TestFixture::new();
    std::fs::write(fixture.entry_path("empty.xml"), "").unwrap();

    let found = fixture
        .storage
        .try_load_entry::<Prefs>("empty.xml", Format::Xml)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_directory_at_entry_path_fails_soft() {
    let fixture = TestFixture::new();
    std::fs::create_dir(fixture.entry_path("folder.xml")).unwrap();

    let loaded: Prefs = fixture.storage.load_entry("folder.xml").await;
    assert_eq!(loaded, Prefs::default());
    assert!(!fixture.storage.delete_entry("folder.xml").await);
    assert!(!fixture.storage.entry_exists("folder.xml").await);
}

#[test]
fn test_corrupt_settings_file_fails_soft() {
    let fixture = TestFixture::new();
    std::fs::write(fixture.settings_path(), "{not json").unwrap();

    let storage = fixture.reopen();
    assert_eq!(storage.load_setting::<String>("theme"), "");
    assert!(!storage.save_setting("theme", "dark"));
    assert!(!storage.delete_setting("theme"));
}

// =============================================================================
// Concurrent Access
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_entry_saves_last_write_wins() {
    let fixture = TestFixture::new();
    let storage = Arc::new(fixture.storage.clone());

    let mut handles = Vec::new();
    for i in 0..16 {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            storage
                .save_entry_as("shared.json", &Prefs { count: i }, Format::Json)
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap());
    }

    // Whichever write landed last, the file is whole and decodable
    let loaded = storage
        .try_load_entry::<Prefs>("shared.json", Format::Json)
        .await
        .unwrap()
        .unwrap();
    assert!((0..16).contains(&loaded.count));
    assert_eq!(storage.list_entries().await, vec!["shared.json"]);
}

#[test]
fn test_concurrent_setting_saves() {
    let fixture = TestFixture::new();
    let storage = Arc::new(fixture.storage.clone());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let storage = Arc::clone(&storage);
            thread::spawn(move || {
                assert!(storage.save_setting(&format!("key{i}"), &i));
                assert!(storage.save_setting("shared", &i));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..8 {
        assert_eq!(storage.load_setting::<i32>(&format!("key{i}")), i);
    }
    assert!((0..8).contains(&storage.load_setting::<i32>("shared")));

    // Every write went through to disk
    let reopened = fixture.reopen();
    assert_eq!(reopened.load_setting::<i32>("key7"), 7);
}

// =============================================================================
// Storage Construction
// =============================================================================

#[tokio::test]
async fn test_default_format_applies_to_short_forms() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::builder("test-app")
        .base_dir(dir.path())
        .default_format(Format::Json)
        .build()
        .unwrap();

    storage.save_entry("prefs", &Prefs { count: 5 }).await;

    let text = std::fs::read_to_string(dir.path().join("entries").join("prefs")).unwrap();
    assert_eq!(text, r#"{"count":5}"#);
}
