//! # Bookmarks
//!
//! An ordered set of verse keys, saved after every change. The web reader
//! stored a bare JSON array of key strings; that shape is still accepted and
//! upgraded on the next write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{KeyValueStore, StoreError};
use crate::quran::types::VerseKeyError;
use crate::quran::{Ayah, QuranError, VerseKey, VerseResolver};

pub const BOOKMARKS_KEY: &str = "bookmarks";
pub const BOOKMARKS_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub key: VerseKey,
    pub added_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct BookmarkFile {
    version: u32,
    bookmarks: Vec<Bookmark>,
}

pub struct BookmarkStore {
    store: Arc<dyn KeyValueStore>,
}

impl BookmarkStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn load(&self) -> Result<Vec<Bookmark>, StoreError> {
        let Some(value) = self.store.get(BOOKMARKS_KEY)? else {
            return Ok(Vec::new());
        };
        match value {
            Value::Array(items) => Ok(migrate_legacy(items)),
            other => {
                let version = other.get("version").and_then(Value::as_u64).unwrap_or(0);
                if version > BOOKMARKS_VERSION as u64 {
                    return Err(StoreError::UnsupportedVersion {
                        key: BOOKMARKS_KEY.to_string(),
                        version: version as u32,
                    });
                }
                let file: BookmarkFile = serde_json::from_value(other)?;
                Ok(file.bookmarks)
            }
        }
    }

    fn persist(&self, bookmarks: Vec<Bookmark>) -> Result<(), StoreError> {
        let file = BookmarkFile {
            version: BOOKMARKS_VERSION,
            bookmarks,
        };
        self.store.set(BOOKMARKS_KEY, &serde_json::to_value(file)?)
    }

    /// Bookmarks in the order they were added.
    pub fn entries(&self) -> Result<Vec<Bookmark>, StoreError> {
        self.load()
    }

    pub fn list(&self) -> Result<Vec<VerseKey>, StoreError> {
        Ok(self.load()?.into_iter().map(|b| b.key).collect())
    }

    pub fn contains(&self, key: &VerseKey) -> Result<bool, StoreError> {
        Ok(self.load()?.iter().any(|b| b.key == *key))
    }

    /// Appends a key. Returns false if it was already bookmarked.
    pub fn add(&self, key: VerseKey) -> Result<bool, StoreError> {
        let mut bookmarks = self.load()?;
        if bookmarks.iter().any(|b| b.key == key) {
            debug!("Bookmark {} already present", key);
            return Ok(false);
        }
        bookmarks.push(Bookmark {
            key,
            added_at: Utc::now(),
        });
        self.persist(bookmarks)?;
        info!("Bookmarked {}", key);
        Ok(true)
    }

    /// Parses and appends a key in `"<surah>:<verse>"` form.
    pub fn add_str(&self, raw: &str) -> Result<bool, StoreError> {
        let key: VerseKey = raw
            .parse()
            .map_err(|e: VerseKeyError| StoreError::InvalidVerseKey(e.to_string()))?;
        self.add(key)
    }

    /// Removes a key. Returns false if it was not bookmarked.
    pub fn remove(&self, key: &VerseKey) -> Result<bool, StoreError> {
        let mut bookmarks = self.load()?;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.key != *key);
        if bookmarks.len() == before {
            return Ok(false);
        }
        self.persist(bookmarks)?;
        info!("Removed bookmark {}", key);
        Ok(true)
    }

    /// Adds the key if absent, removes it if present. Returns whether it is
    /// bookmarked afterwards.
    pub fn toggle(&self, key: VerseKey) -> Result<bool, StoreError> {
        if self.remove(&key)? {
            Ok(false)
        } else {
            self.add(key)
        }
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        info!("Clearing all bookmarks");
        self.persist(Vec::new())
    }

    /// Full verse records for every bookmark, fetched in one batch.
    pub async fn resolve(
        &self,
        resolver: &VerseResolver,
        translation: Option<u16>,
    ) -> Result<Vec<Ayah>, ResolveError> {
        let keys = self.list().map_err(ResolveError::Store)?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        resolver
            .resolve_keys(&keys, translation)
            .await
            .map_err(ResolveError::Quran)
    }
}

fn migrate_legacy(items: Vec<Value>) -> Vec<Bookmark> {
    info!("Migrating {} legacy bookmarks", items.len());
    let now = Utc::now();
    let mut out: Vec<Bookmark> = Vec::with_capacity(items.len());
    for item in items {
        let parsed = item.as_str().map(str::parse::<VerseKey>);
        match parsed {
            Some(Ok(key)) if !out.iter().any(|b| b.key == key) => out.push(Bookmark { key, added_at: now }),
            Some(Ok(key)) => debug!("Dropping duplicate legacy bookmark {}", key),
            Some(Err(e)) => warn!("Dropping legacy bookmark: {}", e),
            None => warn!("Dropping legacy bookmark that is not a string: {}", item),
        }
    }
    out
}

/// Failure while turning bookmarks into verses.
#[derive(Debug)]
pub enum ResolveError {
    Store(StoreError),
    Quran(QuranError),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Store(e) => write!(f, "{e}"),
            ResolveError::Quran(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ResolveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use crate::test_support::StaticSource;
    use serde_json::json;

    fn key(s: &str) -> VerseKey {
        s.parse().unwrap()
    }

    fn memory() -> (Arc<MemoryStore>, BookmarkStore) {
        let kv = Arc::new(MemoryStore::new());
        (kv.clone(), BookmarkStore::new(kv))
    }

    #[test]
    fn test_starts_empty() {
        let (_, store) = memory();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_add_keeps_order_and_uniqueness() {
        let (_, store) = memory();
        assert!(store.add(key("2:255")).unwrap());
        assert!(store.add(key("1:1")).unwrap());
        assert!(!store.add(key("2:255")).unwrap());
        assert_eq!(store.list().unwrap(), vec![key("2:255"), key("1:1")]);
    }

    #[test]
    fn test_add_str_validates() {
        let (_, store) = memory();
        assert!(store.add_str("36:58").unwrap());
        assert!(matches!(store.add_str("1:99"), Err(StoreError::InvalidVerseKey(_))));
        assert!(matches!(store.add_str("nonsense"), Err(StoreError::InvalidVerseKey(_))));
    }

    #[test]
    fn test_remove_and_clear() {
        let (_, store) = memory();
        store.add(key("1:1")).unwrap();
        store.add(key("1:2")).unwrap();
        assert!(store.remove(&key("1:1")).unwrap());
        assert!(!store.remove(&key("1:1")).unwrap());
        assert_eq!(store.list().unwrap(), vec![key("1:2")]);
        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_toggle() {
        let (_, store) = memory();
        assert!(store.toggle(key("18:10")).unwrap());
        assert!(store.contains(&key("18:10")).unwrap());
        assert!(!store.toggle(key("18:10")).unwrap());
        assert!(!store.contains(&key("18:10")).unwrap());
    }

    #[test]
    fn test_persisted_after_each_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let store = BookmarkStore::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        store.add(key("112:1")).unwrap();

        let reopened = BookmarkStore::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        assert_eq!(reopened.list().unwrap(), vec![key("112:1")]);
    }

    #[test]
    fn test_migrates_legacy_array() {
        let (kv, store) = memory();
        kv.set(BOOKMARKS_KEY, &json!(["2:255", "2:255", "bad", 7, "1:1"])).unwrap();
        assert_eq!(store.list().unwrap(), vec![key("2:255"), key("1:1")]);

        // The next write upgrades the record
        store.add(key("3:1")).unwrap();
        let raw = kv.get(BOOKMARKS_KEY).unwrap().unwrap();
        assert_eq!(raw["version"], json!(BOOKMARKS_VERSION));
        assert_eq!(raw["bookmarks"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_rejects_newer_schema() {
        let (kv, store) = memory();
        kv.set(BOOKMARKS_KEY, &json!({"version": 5, "bookmarks": []})).unwrap();
        assert!(matches!(store.list(), Err(StoreError::UnsupportedVersion { .. })));
    }

    #[tokio::test]
    async fn test_resolve_bookmarks() {
        let (_, store) = memory();
        store.add(key("112:2")).unwrap();
        store.add(key("1:1")).unwrap();
        let resolver = VerseResolver::new(Arc::new(StaticSource::new()));

        let verses = store.resolve(&resolver, Some(131)).await.unwrap();
        assert_eq!(verses.len(), 2);
        assert_eq!(verses[0].verse_key, key("112:2"));
        assert_eq!(verses[1].translation.as_deref(), Some("[131] 1:1"));
    }

    #[tokio::test]
    async fn test_resolve_empty_skips_network() {
        let (_, store) = memory();
        let source = StaticSource::new().failing();
        let resolver = VerseResolver::new(Arc::new(source));
        assert!(store.resolve(&resolver, Some(131)).await.unwrap().is_empty());
    }
}
