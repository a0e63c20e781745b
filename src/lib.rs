//! # stowage - typed save/load/delete for application data
//!
//! A small persistence facade that puts arbitrary serde types somewhere
//! durable and gets them back later, without per-call-site file or settings
//! plumbing.
//!
//! ## Features
//!
//! - **Entries**: Objects stored as files under a path inside a folder scope
//! - **Settings**: Values stored under a key inside a key/value container
//! - **Two Formats**: XML markup (Format A) or compact JSON (Format B), chosen per call
//! - **Fail-Soft API**: `bool` / default-value results, with `try_*` variants for diagnostics
//! - **Atomic Writes**: Temp file + rename, no partial file on success
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stowage::{Format, Storage};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Prefs {
//!     count: i32,
//! }
//!
//! # async fn example() -> stowage::Result<()> {
//! let storage = Storage::builder("my-app").build()?;
//!
//! // Entries: format A by default, or pick one per call
//! storage.save_entry("prefs.xml", &Prefs { count: 5 }).await;
//! storage.save_entry_as("prefs.json", &Prefs { count: 5 }, Format::Json).await;
//!
//! let prefs: Prefs = storage.load_entry("prefs.xml").await;
//! assert_eq!(prefs.count, 5);
//!
//! // Settings
//! storage.save_setting("theme", "dark");
//! let theme: String = storage.load_setting("theme");
//! let wrong: i32 = storage.load_setting("theme"); // type mismatch -> 0
//! # Ok(())
//! # }
//! ```
//!
//! ## Formats
//!
//! Nothing about the format is stored next to an entry. Load with the same
//! [`Format`] you saved with; a mismatch fails to decode and, on the
//! fail-soft path, yields the default value.
//!
//! ## Explicit Scopes
//!
//! Every short-form operation has an explicit form taking the scope or
//! container to use:
//!
//! ```rust,no_run
//! use stowage::{EntryScope, Format, MemoryContainer, Storage};
//!
//! # async fn example() {
//! let cache = EntryScope::new("/tmp/my-app-cache");
//! Storage::save_entry_in(&cache, "today.json", &vec![1, 2, 3], Format::Json).await;
//!
//! let session = MemoryContainer::new("session");
//! Storage::save_setting_in(&session, "token", "abc");
//! # }
//! ```

// Core modules
pub mod codec;
pub mod entries;
mod error;
mod manager;
pub mod settings;
mod sync;

// Grouped modules
pub mod config;

// Re-exports from core
pub use codec::{Codec, Format, JsonCodec, XmlCodec};
pub use entries::EntryScope;
pub use error::{Error, ErrorKind, Result};
pub use manager::{Storage, StorageBuilder};
pub use settings::{FileContainer, MemoryContainer, SettingContainer};

#[cfg(feature = "toml")]
pub use codec::TomlCodec;
#[cfg(feature = "yaml")]
pub use codec::YamlCodec;

// Re-exports from config
pub use config::{ScopeKind, StorageConfig, StorageConfigBuilder};
