//! # Verse Resolver
//!
//! Turns chapter ids and verse keys into verses, checking the embedded table
//! before going to the network, and merges translations in by position.
//!
//! ```text
//! resolve_chapter(surah, translation)
//!   ├── resolve_verses(surah)        local table → VerseSource
//!   └── resolve_translation(surah)   always VerseSource
//!          └── align_translations()  zip by index
//! ```
//!
//! Nothing is cached: every call goes back to the table or the source.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use futures::future::join_all;
use futures::stream;
use log::{debug, info, warn};
use serde::Serialize;

use super::data::{SURAHS, find_surah, local_verses};
use super::source::{QuranError, VerseSource};
use super::text::{is_arabic, normalize_arabic};
use super::types::{Ayah, SearchHit, VerseKey};

/// Chapters fetched at once while scanning for an Arabic query.
const ARABIC_SEARCH_CONCURRENCY: usize = 8;
/// Hits returned for an Arabic query.
const MAX_ARABIC_HITS: usize = 50;

/// What a reader view shows for one chapter. On failure `verses` is empty and
/// `error` holds the message to display next to a retry control.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChapterView {
    pub surah: u16,
    pub verses: Vec<Ayah>,
    pub error: Option<String>,
}

/// Attaches translations to verses by index. The result always has one entry
/// per verse: surplus translations are dropped, missing ones stay `None`.
pub fn align_translations(mut verses: Vec<Ayah>, translations: Vec<String>) -> Vec<Ayah> {
    if verses.len() != translations.len() {
        debug!(
            "Translation count {} differs from verse count {}",
            translations.len(),
            verses.len()
        );
    }
    for (verse, text) in verses.iter_mut().zip(translations) {
        verse.translation = Some(text);
    }
    verses
}

pub struct VerseResolver {
    source: Arc<dyn VerseSource>,
}

impl VerseResolver {
    pub fn new(source: Arc<dyn VerseSource>) -> Self {
        Self { source }
    }

    /// Verses of a chapter, Arabic text only. The embedded table wins when it
    /// has the chapter.
    pub async fn resolve_verses(&self, surah: u16) -> Result<Vec<Ayah>, QuranError> {
        let info = find_surah(surah).ok_or_else(|| QuranError::NotFound(format!("surah {surah}")))?;

        if let Some(local) = local_verses(surah) {
            debug!("Surah {} served from embedded table ({} verses)", surah, local.len());
            return Ok(local);
        }

        let verses = self.source.chapter_verses(surah).await?;
        if verses.is_empty() {
            return Err(QuranError::NotFound(format!("verses of {}", info.name)));
        }
        Ok(verses)
    }

    /// Translation strings for a chapter, in verse order. Always remote.
    ///
    /// The result covers the whole chapter, so it can be longer than
    /// [`resolve_verses`](Self::resolve_verses) for chapters whose embedded
    /// table is only a prefix (chapter 3). Merge through
    /// [`align_translations`] or use [`resolve_chapter`](Self::resolve_chapter).
    pub async fn resolve_translation(
        &self,
        surah: u16,
        translation: u16,
    ) -> Result<Vec<String>, QuranError> {
        if find_surah(surah).is_none() {
            return Err(QuranError::NotFound(format!("surah {surah}")));
        }
        self.source.chapter_translation(surah, translation).await
    }

    /// Verses and translation fetched side by side, then merged.
    ///
    /// A verse failure empties the view; a translation failure keeps the
    /// Arabic text and reports the error.
    pub async fn resolve_chapter(&self, surah: u16, translation: Option<u16>) -> ChapterView {
        let translation_fut = async {
            match translation {
                Some(id) => Some(self.resolve_translation(surah, id).await),
                None => None,
            }
        };
        let (verses, translations) = futures::join!(self.resolve_verses(surah), translation_fut);

        match (verses, translations) {
            (Err(e), _) => {
                warn!("Failed to load surah {}: {}", surah, e);
                ChapterView {
                    surah,
                    verses: Vec::new(),
                    error: Some(format!("Could not load verses: {e}")),
                }
            }
            (Ok(verses), None) => ChapterView {
                surah,
                verses,
                error: None,
            },
            (Ok(verses), Some(Ok(texts))) => ChapterView {
                surah,
                verses: align_translations(verses, texts),
                error: None,
            },
            (Ok(verses), Some(Err(e))) => {
                warn!("Failed to load translation for surah {}: {}", surah, e);
                ChapterView {
                    surah,
                    verses,
                    error: Some(format!("Could not load translation: {e}")),
                }
            }
        }
    }

    /// Verses of a chapter up to at least `last_verse`. The embedded table
    /// only holds a prefix of some chapters, so fall through to the source
    /// when it stops short.
    async fn verses_through(&self, surah: u16, last_verse: u16) -> Result<Vec<Ayah>, QuranError> {
        let verses = self.resolve_verses(surah).await?;
        if verses.len() >= last_verse as usize {
            return Ok(verses);
        }
        debug!(
            "Embedded surah {} stops at verse {}, fetching remotely",
            surah,
            verses.len()
        );
        self.source.chapter_verses(surah).await
    }

    async fn chapter_for_keys(
        &self,
        surah: u16,
        last_verse: u16,
        translation: Option<u16>,
    ) -> Result<Vec<Ayah>, QuranError> {
        let translation_fut = async {
            match translation {
                Some(id) => self.resolve_translation(surah, id).await.map(Some),
                None => Ok(None),
            }
        };
        let (verses, translations) =
            futures::join!(self.verses_through(surah, last_verse), translation_fut);
        let verses = verses?;
        Ok(match translations? {
            Some(texts) => align_translations(verses, texts),
            None => verses,
        })
    }

    /// Resolves many verse keys at once. Each chapter is fetched a single
    /// time and chapters are fetched concurrently; the output follows the
    /// order of `keys`. Keys the source does not know are skipped.
    pub async fn resolve_keys(
        &self,
        keys: &[VerseKey],
        translation: Option<u16>,
    ) -> Result<Vec<Ayah>, QuranError> {
        // (surah, highest verse needed), first-seen order
        let mut chapters: Vec<(u16, u16)> = Vec::new();
        for key in keys {
            match chapters.iter_mut().find(|(s, _)| *s == key.surah) {
                Some(entry) => entry.1 = entry.1.max(key.verse),
                None => chapters.push((key.surah, key.verse)),
            }
        }
        info!(
            "Resolving {} verse keys across {} chapters",
            keys.len(),
            chapters.len()
        );

        let fetched = join_all(
            chapters
                .iter()
                .map(|&(surah, last)| self.chapter_for_keys(surah, last, translation)),
        )
        .await;

        let mut by_surah: HashMap<u16, Vec<Ayah>> = HashMap::new();
        for (&(surah, _), result) in chapters.iter().zip(fetched) {
            by_surah.insert(surah, result?);
        }

        Ok(keys
            .iter()
            .filter_map(|key| {
                let found = by_surah
                    .get(&key.surah)
                    .and_then(|verses| verses.iter().find(|a| a.verse_key == *key))
                    .cloned();
                if found.is_none() {
                    warn!("Verse {} missing from source", key);
                }
                found
            })
            .collect())
    }

    /// Searches verse text. Arabic queries are matched locally against the
    /// normalized text of every chapter; anything else goes to the API.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, QuranError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        if is_arabic(query) {
            self.search_arabic(query).await
        } else {
            self.source.search(query).await
        }
    }

    async fn search_arabic(&self, query: &str) -> Result<Vec<SearchHit>, QuranError> {
        let needle = normalize_arabic(query);
        if needle.is_empty() {
            debug!("Arabic query {:?} is only diacritics, nothing to match", query);
            return Ok(Vec::new());
        }
        info!("Arabic search for {:?} across {} chapters", needle, SURAHS.len());

        let chapters: Vec<Result<Vec<Ayah>, QuranError>> = stream::iter(SURAHS.iter())
            .map(|s| self.verses_through(s.id, s.verse_count))
            .buffered(ARABIC_SEARCH_CONCURRENCY)
            .collect()
            .await;

        let mut hits = Vec::new();
        for chapter in chapters {
            for ayah in chapter? {
                if hits.len() >= MAX_ARABIC_HITS {
                    return Ok(hits);
                }
                if normalize_arabic(&ayah.text).contains(&needle) {
                    hits.push(SearchHit {
                        verse_key: ayah.verse_key,
                        text: ayah.text,
                        translation: None,
                    });
                }
            }
        }
        Ok(hits)
    }
}
