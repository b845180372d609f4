use std::fmt;

use async_trait::async_trait;

use super::types::{Ayah, SearchHit};

/// Errors from looking up verse content.
#[derive(Debug)]
pub enum QuranError {
    /// The chapter or verse is absent from both the local table and the API.
    NotFound(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// API returned an error response.
    Api { status: u16, message: String },
    /// Failed to parse the API's response.
    Parse(String),
}

impl fmt::Display for QuranError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuranError::NotFound(what) => write!(f, "not found: {what}"),
            QuranError::Network(msg) => write!(f, "network error: {msg}"),
            QuranError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            QuranError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for QuranError {}

/// Remote verse content. The resolver only talks to this trait so tests can
/// swap in a fixed table.
#[async_trait]
pub trait VerseSource: Send + Sync {
    /// All verses of a chapter in order, Uthmani text only.
    async fn chapter_verses(&self, surah: u16) -> Result<Vec<Ayah>, QuranError>;

    /// One translation string per verse, in verse order.
    async fn chapter_translation(
        &self,
        surah: u16,
        translation: u16,
    ) -> Result<Vec<String>, QuranError>;

    /// Full-text search across translations.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, QuranError>;
}
