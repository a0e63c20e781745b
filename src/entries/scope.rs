//! Folder scope for entries

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Suffix of in-flight temporary files; never a valid entry
pub(crate) const TEMP_SUFFIX: &str = ".stowage-tmp";

/// Handle to a folder that holds entries
///
/// Entry paths are relative to the scope root and may name sub-folders
/// (`"cache/today.json"`). Paths that would leave the root are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryScope {
    root: PathBuf,
}

impl EntryScope {
    /// Create a scope rooted at the given folder
    ///
    /// The folder does not need to exist yet; it is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root folder of this scope
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an entry path to a file path inside this scope
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for empty or absolute paths, paths with
    /// `..` components, and paths using the temporary file suffix.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let invalid = |reason: &str| Error::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if path.trim().is_empty() {
            return Err(invalid("path is empty"));
        }
        if path.ends_with(TEMP_SUFFIX) {
            return Err(invalid("reserved suffix"));
        }

        let mut resolved = self.root.clone();
        let mut depth = 0usize;
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir => return Err(invalid("must not contain '..'")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("must be relative to the scope"));
                }
            }
        }

        if depth == 0 {
            return Err(invalid("must name a file"));
        }
        Ok(resolved)
    }
}

impl From<PathBuf> for EntryScope {
    fn from(root: PathBuf) -> Self {
        Self::new(root)
    }
}

impl From<&Path> for EntryScope {
    fn from(root: &Path) -> Self {
        Self::new(root)
    }
}
