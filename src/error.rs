//! Error types for stowage

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stowage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure class of an [`Error`]
///
/// The fail-soft facade collapses every class to `false` or a default value,
/// but the class stays available for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Target path, key or scope does not exist or cannot be reached
    Resolution,
    /// Value/type mismatch or malformed bytes
    Codec,
    /// Underlying read, write, flush or container failure
    Io,
}

/// Main error type for stowage
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Resolution Errors
    // -------------------------------------------------------------------------
    #[error("Entry not found: {}", .0.display())]
    EntryNotFound(PathBuf),

    #[error("Invalid entry path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Storage scope unavailable: {0}")]
    ScopeUnavailable(String),

    #[error("Setting not found: {0}")]
    SettingNotFound(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("{format} codec failed: {reason}")]
    Codec {
        format: &'static str,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{}': {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete file '{}': {source}", .path.display())]
    FileDelete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{}': {source}", .path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory '{}': {source}", .path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Settings Container Errors
    // -------------------------------------------------------------------------
    #[error("Setting '{key}' rejected: {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Settings container error: {0}")]
    Container(String),
}

impl Error {
    /// Build a codec error from any displayable cause
    pub(crate) fn codec(format: &'static str, cause: impl std::fmt::Display) -> Self {
        Error::Codec {
            format,
            reason: cause.to_string(),
        }
    }

    /// Failure class of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EntryNotFound(_)
            | Error::InvalidPath { .. }
            | Error::ScopeUnavailable(_)
            | Error::SettingNotFound(_) => ErrorKind::Resolution,
            Error::Codec { .. } | Error::InvalidSetting { .. } => ErrorKind::Codec,
            Error::FileRead { .. }
            | Error::FileWrite { .. }
            | Error::FileDelete { .. }
            | Error::DirectoryCreate { .. }
            | Error::DirectoryRead { .. }
            | Error::Container(_) => ErrorKind::Io,
        }
    }

    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::EntryNotFound(_) | Error::SettingNotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::codec("json", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::EntryNotFound(PathBuf::from("a.xml")).kind(),
            ErrorKind::Resolution
        );
        assert_eq!(Error::codec("xml", "bad tag").kind(), ErrorKind::Codec);
        assert_eq!(
            Error::FileWrite {
                path: PathBuf::from("a.xml"),
                source: std::io::Error::other("disk full"),
            }
            .kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn test_not_found() {
        assert!(Error::SettingNotFound("theme".into()).is_not_found());
        assert!(!Error::Container("closed".into()).is_not_found());
    }

    #[test]
    fn test_display_includes_path() {
        let err = Error::EntryNotFound(PathBuf::from("prefs.xml"));
        assert!(err.to_string().contains("prefs.xml"));
    }
}
