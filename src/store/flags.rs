//! Dialog-seen markers. Each dialog shows once per backing store: a
//! `MemoryStore` gives once per session, a `FileStore` once per install.

use std::sync::Arc;

use serde_json::Value;

use super::{KeyValueStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogFlag {
    /// First-run welcome notice.
    Welcome,
    /// "Support this project" notice.
    Support,
}

impl DialogFlag {
    fn key(self) -> &'static str {
        match self {
            DialogFlag::Welcome => "dialog.welcome_seen",
            DialogFlag::Support => "dialog.support_seen",
        }
    }
}

pub struct SessionFlags {
    store: Arc<dyn KeyValueStore>,
}

impl SessionFlags {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn has_seen(&self, flag: DialogFlag) -> Result<bool, StoreError> {
        Ok(matches!(self.store.get(flag.key())?, Some(Value::Bool(true))))
    }

    pub fn mark_seen(&self, flag: DialogFlag) -> Result<(), StoreError> {
        self.store.set(flag.key(), &Value::Bool(true))
    }

    /// Marks the flag and reports whether this was the first time.
    pub fn first_time(&self, flag: DialogFlag) -> Result<bool, StoreError> {
        if self.has_seen(flag)? {
            return Ok(false);
        }
        self.mark_seen(flag)?;
        Ok(true)
    }
}
