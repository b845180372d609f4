//! # Persisted Client State
//!
//! Reader settings, bookmarks, and dialog flags, each stored as JSON under a
//! fixed key. Stores are handed a [`KeyValueStore`] so callers decide where
//! the data lives (`~/.noor/` on disk, or memory for a single session).

pub mod bookmarks;
pub mod flags;
pub mod kv;
pub mod settings;

use std::fmt;
use std::io;

pub use bookmarks::{Bookmark, BookmarkStore, ResolveError};
pub use flags::{DialogFlag, SessionFlags};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use settings::{FontStyle, SettingKey, Settings, SettingsStore};

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Serde(serde_json::Error),
    /// Persisted record was written by a newer schema than this build knows.
    UnsupportedVersion { key: String, version: u32 },
    UnknownSetting(String),
    InvalidValue { key: String, message: String },
    InvalidVerseKey(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage I/O error: {e}"),
            StoreError::Serde(e) => write!(f, "storage format error: {e}"),
            StoreError::UnsupportedVersion { key, version } => {
                write!(f, "{key} was saved by a newer version (schema {version})")
            }
            StoreError::UnknownSetting(key) => write!(f, "unknown setting: {key}"),
            StoreError::InvalidValue { key, message } => {
                write!(f, "invalid value for {key}: {message}")
            }
            StoreError::InvalidVerseKey(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serde(e)
    }
}
