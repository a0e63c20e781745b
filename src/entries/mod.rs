//! Entry store: file-backed objects addressed by a path inside a folder scope
//!
//! Every operation comes in two flavors:
//!
//! - `try_*` returns a [`Result`] so callers and tests can tell resolution,
//!   codec and I/O failures apart.
//! - The plain form is fail-soft: `save`/`delete` return `false` and `load`
//!   returns `T::default()` on any failure. Errors are logged, not propagated.
//!
//! Writes go to a uniquely named temporary file in the target folder that is
//! flushed, synced and renamed over the target, so a successful save never
//! leaves a partial file. Concurrent writers to the same path are not
//! coordinated; the last rename wins.

mod scope;

pub use scope::EntryScope;

use crate::codec::{Codec, Format};
use crate::error::{Error, Result};
use log::{debug, warn};
use scope::TEMP_SUFFIX;
use serde::{Serialize, de::DeserializeOwned};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// =============================================================================
// Raw payload I/O
// =============================================================================

/// Unique sibling temp path for `target`: `<name>.<pid>-<n>.stowage-tmp`
pub(crate) fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let file_name = target.file_name().ok_or_else(|| Error::InvalidPath {
        path: target.display().to_string(),
        reason: "must have a filename".into(),
    })?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(format!(
        ".{}-{}{TEMP_SUFFIX}",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    Ok(target.with_file_name(temp_name))
}

async fn write_and_sync(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = fs::File::create(path).await.map_err(write_err)?;
    file.write_all(bytes).await.map_err(write_err)?;
    file.flush().await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)
}

/// Replace `target` with `bytes` via temp file + rename
async fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    let temp_path = temp_path_for(target)?;
    if let Err(e) = write_and_sync(&temp_path, bytes).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_path, target).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(Error::FileWrite {
            path: target.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

/// Write a raw payload to an entry
///
/// An empty payload is not written; the call succeeds without touching the
/// file.
///
/// # Errors
///
/// Returns an error if the path is invalid or the write fails.
pub async fn try_save_bytes(scope: &EntryScope, path: &str, bytes: &[u8]) -> Result<()> {
    let target = scope.resolve(path)?;
    if bytes.is_empty() {
        debug!("Nothing to persist for entry '{path}', skipping write");
        return Ok(());
    }
    write_atomic(&target, bytes).await?;
    debug!("Saved entry '{path}' ({} bytes)", bytes.len());
    Ok(())
}

/// Read the raw payload of an entry
///
/// Returns `Ok(None)` if the entry does not exist or is empty.
///
/// # Errors
///
/// Returns an error if the path is invalid or the read fails.
pub async fn try_load_bytes(scope: &EntryScope, path: &str) -> Result<Option<Vec<u8>>> {
    let target = scope.resolve(path)?;
    match fs::read(&target).await {
        Ok(bytes) if bytes.is_empty() => Ok(None),
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::FileRead {
            path: target,
            source: e,
        }),
    }
}

// =============================================================================
// Typed operations
// =============================================================================

/// Encode `value` with `codec` and store it under `path`
///
/// # Errors
///
/// Returns a codec, resolution or I/O error.
pub async fn try_save_with<T, C>(scope: &EntryScope, path: &str, value: &T, codec: &C) -> Result<()>
where
    T: Serialize,
    C: Codec,
{
    // Resolve first so an invalid path is reported before encoding work.
    scope.resolve(path)?;
    let bytes = codec.encode(value)?;
    try_save_bytes(scope, path, &bytes).await
}

/// Encode `value` in `format` and store it under `path`
///
/// # Errors
///
/// Returns a codec, resolution or I/O error.
pub async fn try_save<T: Serialize>(
    scope: &EntryScope,
    path: &str,
    value: &T,
    format: Format,
) -> Result<()> {
    try_save_with(scope, path, value, &format).await
}

/// Load and decode the entry at `path`
///
/// Returns `Ok(None)` if the entry does not exist (or is empty).
///
/// # Errors
///
/// Returns a codec, resolution or I/O error.
pub async fn try_load_with<T, C>(scope: &EntryScope, path: &str, codec: &C) -> Result<Option<T>>
where
    T: DeserializeOwned,
    C: Codec,
{
    match try_load_bytes(scope, path).await? {
        Some(bytes) => codec.decode(&bytes).map(Some),
        None => Ok(None),
    }
}

/// Load the entry at `path`, decoding with `format`
///
/// # Errors
///
/// Returns a codec, resolution or I/O error.
pub async fn try_load<T: DeserializeOwned>(
    scope: &EntryScope,
    path: &str,
    format: Format,
) -> Result<Option<T>> {
    try_load_with(scope, path, &format).await
}

/// Remove the entry at `path`
///
/// # Errors
///
/// Returns [`Error::EntryNotFound`] if there is no such entry, or an I/O error.
pub async fn try_delete(scope: &EntryScope, path: &str) -> Result<()> {
    let target = scope.resolve(path)?;
    match fs::remove_file(&target).await {
        Ok(()) => {
            debug!("Deleted entry '{path}'");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::EntryNotFound(target)),
        Err(e) => Err(Error::FileDelete {
            path: target,
            source: e,
        }),
    }
}

/// List the paths of all entries in a scope, relative and `/`-separated
///
/// A scope whose folder does not exist yet is empty.
///
/// # Errors
///
/// Returns an error if a folder inside the scope cannot be read.
pub async fn try_list(scope: &EntryScope) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    let mut pending = vec![scope.root().to_path_buf()];

    while let Some(dir) = pending.pop() {
        let read_err = |e| Error::DirectoryRead {
            path: dir.clone(),
            source: e,
        };
        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(read_err(e)),
        };

        while let Some(item) = reader.next_entry().await.map_err(read_err)? {
            let path = item.path();
            let file_type = item.file_type().await.map_err(read_err)?;
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            if path.to_string_lossy().ends_with(TEMP_SUFFIX) {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(scope.root()) {
                let parts: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                entries.push(parts.join("/"));
            }
        }
    }

    entries.sort();
    Ok(entries)
}

// =============================================================================
// Fail-soft operations
// =============================================================================

/// Save `value` under `path` using a custom codec, reporting success as a bool
pub async fn save_with<T, C>(scope: &EntryScope, path: &str, value: &T, codec: &C) -> bool
where
    T: Serialize,
    C: Codec,
{
    match try_save_with(scope, path, value, codec).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save entry '{path}': {e}");
            false
        }
    }
}

/// Save `value` under `path` in `format`, reporting success as a bool
pub async fn save<T: Serialize>(scope: &EntryScope, path: &str, value: &T, format: Format) -> bool {
    save_with(scope, path, value, &format).await
}

/// Load the entry at `path` with a custom codec, or `None` on any failure
pub async fn load_opt_with<T, C>(scope: &EntryScope, path: &str, codec: &C) -> Option<T>
where
    T: DeserializeOwned,
    C: Codec,
{
    match try_load_with(scope, path, codec).await {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            debug!("Entry '{path}' not found");
            None
        }
        Err(e) => {
            warn!("Failed to load entry '{path}': {e}");
            None
        }
    }
}

/// Load the entry at `path`, or `None` on any failure
pub async fn load_opt<T: DeserializeOwned>(
    scope: &EntryScope,
    path: &str,
    format: Format,
) -> Option<T> {
    load_opt_with(scope, path, &format).await
}

/// Load the entry at `path` with a custom codec, or `T::default()` on any failure
pub async fn load_with<T, C>(scope: &EntryScope, path: &str, codec: &C) -> T
where
    T: DeserializeOwned + Default,
    C: Codec,
{
    load_opt_with(scope, path, codec).await.unwrap_or_default()
}

/// Load the entry at `path`, or `T::default()` on any failure
///
/// Missing, unreadable and undecodable entries are indistinguishable here;
/// use [`try_load`] to tell them apart.
pub async fn load<T>(scope: &EntryScope, path: &str, format: Format) -> T
where
    T: DeserializeOwned + Default,
{
    load_with(scope, path, &format).await
}

/// Remove the entry at `path`, reporting success as a bool
///
/// Deleting an entry that does not exist reports `false`.
pub async fn delete(scope: &EntryScope, path: &str) -> bool {
    match try_delete(scope, path).await {
        Ok(()) => true,
        Err(e) if e.is_not_found() => {
            debug!("Cannot delete entry '{path}': not found");
            false
        }
        Err(e) => {
            warn!("Failed to delete entry '{path}': {e}");
            false
        }
    }
}

/// Check whether an entry exists at `path`
pub async fn exists(scope: &EntryScope, path: &str) -> bool {
    match scope.resolve(path) {
        Ok(target) => fs::metadata(&target)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// List entries in a scope, or an empty list on failure
pub async fn list(scope: &EntryScope) -> Vec<String> {
    try_list(scope).await.unwrap_or_else(|e| {
        warn!("Failed to list entries in '{}': {e}", scope.root().display());
        Vec::new()
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Counter {
        count: i32,
    }

    /// Codec that always produces an empty payload
    struct EmptyCodec;

    impl Codec for EmptyCodec {
        fn name(&self) -> &'static str {
            "empty"
        }

        fn extension(&self) -> &'static str {
            "bin"
        }

        fn encode<T: Serialize>(&self, _value: &T) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn decode<T: DeserializeOwned>(&self, _bytes: &[u8]) -> Result<T> {
            Err(Error::codec("empty", "cannot decode"))
        }
    }

    #[test]
    fn test_temp_paths_are_unique_siblings() {
        let target = Path::new("/data/prefs.xml");
        let first = temp_path_for(target).unwrap();
        let second = temp_path_for(target).unwrap();

        assert_ne!(first, second);
        assert_eq!(first.parent(), target.parent());
        assert!(first.to_string_lossy().ends_with(TEMP_SUFFIX));
    }

    #[tokio::test]
    async fn test_save_creates_parent_folders() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path());

        try_save(&scope, "a/b/c.json", &Counter { count: 1 }, Format::Json)
            .await
            .unwrap();

        assert!(dir.path().join("a/b/c.json").is_file());
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path());

        for i in 0..3 {
            assert!(save(&scope, "prefs.xml", &Counter { count: i }, Format::Xml).await);
        }

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["prefs.xml".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_payload_skips_write() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path());

        assert!(save_with(&scope, "nothing.bin", &Counter { count: 1 }, &EmptyCodec).await);
        assert!(!dir.path().join("nothing.bin").exists());
    }

    #[tokio::test]
    async fn test_empty_payload_leaves_existing_file() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path());

        try_save(&scope, "keep.json", &Counter { count: 9 }, Format::Json)
            .await
            .unwrap();
        assert!(save_with(&scope, "keep.json", &Counter { count: 1 }, &EmptyCodec).await);

        let loaded: Counter = load(&scope, "keep.json", Format::Json).await;
        assert_eq!(loaded.count, 9);
    }

    #[tokio::test]
    async fn test_empty_file_loads_as_missing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("empty.json"), b"").unwrap();
        let scope = EntryScope::new(dir.path());

        let result: Option<Counter> = try_load(&scope, "empty.json", Format::Json).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_try_load_missing_is_none() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path());

        let result: Option<Counter> = try_load(&scope, "missing.xml", Format::Xml).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_try_load_corrupt_is_codec_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), b"{not json").unwrap();
        let scope = EntryScope::new(dir.path());

        let result: Result<Option<Counter>> = try_load_with(&scope, "bad.json", &JsonCodec::new()).await;
        assert!(matches!(result, Err(Error::Codec { .. })));

        let fallback: Counter = load(&scope, "bad.json", Format::Json).await;
        assert_eq!(fallback, Counter::default());
    }

    #[tokio::test]
    async fn test_try_delete_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path());

        let err = try_delete(&scope, "missing.xml").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!delete(&scope, "missing.xml").await);
    }

    #[tokio::test]
    async fn test_invalid_path_fails_soft() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path());

        assert!(!save(&scope, "../escape.json", &Counter { count: 1 }, Format::Json).await);
        assert!(!delete(&scope, "../escape.json").await);
        assert!(!exists(&scope, "../escape.json").await);
    }

    #[tokio::test]
    async fn test_raw_bytes_roundtrip() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path());

        try_save_bytes(&scope, "blob.bin", &[1, 2, 3]).await.unwrap();
        let bytes = try_load_bytes(&scope, "blob.bin").await.unwrap();
        assert_eq!(bytes, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_list_entries() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path());

        try_save_bytes(&scope, "b.json", b"{}").await.unwrap();
        try_save_bytes(&scope, "a/nested.xml", b"<A/>").await.unwrap();
        std::fs::write(dir.path().join("stale.json.1-1.stowage-tmp"), b"x").unwrap();

        assert_eq!(list(&scope).await, vec!["a/nested.xml", "b.json"]);
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path().join("not-created"));

        assert!(try_list(&scope).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempdir().unwrap();
        let scope = EntryScope::new(dir.path());

        assert!(!exists(&scope, "x.json").await);
        try_save_bytes(&scope, "x.json", b"1").await.unwrap();
        assert!(exists(&scope, "x.json").await);
    }
}
