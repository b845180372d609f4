//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::inference::{CompletionProvider, CompletionRequest, OutputSchema, Prompt, ProviderError};
use crate::quran::data::SURAHS;
use crate::quran::{Ayah, QuranError, SearchHit, VerseKey, VerseSource};

// ============================================================================
// Verse source
// ============================================================================

/// Counts calls into a [`StaticSource`].
#[derive(Default)]
pub struct CallLog {
    chapters: AtomicUsize,
    translations: AtomicUsize,
}

impl CallLog {
    pub fn chapter_count(&self) -> usize {
        self.chapters.load(Ordering::SeqCst)
    }

    pub fn translation_count(&self) -> usize {
        self.translations.load(Ordering::SeqCst)
    }
}

/// An offline verse source covering all 114 chapters with filler text.
pub struct StaticSource {
    pub calls: Arc<CallLog>,
    failing: bool,
    empty: HashSet<u16>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(CallLog::default()),
            failing: false,
            empty: HashSet::new(),
        }
    }

    /// Every call fails with a network error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// The given chapter comes back with no verses.
    pub fn with_empty_chapter(mut self, surah: u16) -> Self {
        self.empty.insert(surah);
        self
    }

    fn check(&self) -> Result<(), QuranError> {
        if self.failing {
            return Err(QuranError::Network("connection refused".to_string()));
        }
        Ok(())
    }

    fn verse_count(surah: u16) -> u16 {
        SURAHS
            .iter()
            .find(|s| s.id == surah)
            .map(|s| s.verse_count)
            .unwrap_or(0)
    }
}

#[async_trait]
impl VerseSource for StaticSource {
    async fn chapter_verses(&self, surah: u16) -> Result<Vec<Ayah>, QuranError> {
        self.calls.chapters.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.empty.contains(&surah) {
            return Ok(Vec::new());
        }
        Ok((1..=Self::verse_count(surah))
            .map(|v| {
                let key = VerseKey { surah, verse: v };
                Ayah {
                    id: key.global_id(),
                    verse_key: key,
                    text: format!("كلمة {surah} {v}"),
                    translation: None,
                }
            })
            .collect())
    }

    async fn chapter_translation(&self, surah: u16, translation: u16) -> Result<Vec<String>, QuranError> {
        self.calls.translations.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok((1..=Self::verse_count(surah))
            .map(|v| format!("[{translation}] {surah}:{v}"))
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, QuranError> {
        self.check()?;
        Ok(vec![SearchHit {
            verse_key: VerseKey { surah: 1, verse: 1 },
            text: "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ".to_string(),
            translation: Some(format!("result for {query}")),
        }])
    }
}

// ============================================================================
// Completion provider
// ============================================================================

/// What a [`ScriptedProvider`] was asked.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: Prompt,
    pub schema: OutputSchema,
}

/// Replies to every request with the same canned text, or the same error.
pub struct ScriptedProvider {
    reply: Result<String, ProviderError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new(reply: serde_json::Value) -> Self {
        Self::raw(reply.to_string())
    }

    pub fn raw(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            reply: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: request.model.to_string(),
            prompt: request.prompt.clone(),
            schema: request.schema.clone(),
        });
        self.reply.clone()
    }
}
