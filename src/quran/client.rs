//! quran.com v4 API client.
//!
//! Endpoints used:
//! - `GET /quran/verses/uthmani?chapter_number=N` for chapter text
//! - `GET /quran/translations/{id}?chapter_number=N` for a translation
//! - `GET /search?q=..` for full-text search
//! - `GET /chapter_recitations/{reciter}/{chapter}?segments=true` for audio

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::audio::{AudioFileResponse, ChapterAudio};
use super::source::{QuranError, VerseSource};
use super::text::strip_markup;
use super::types::{Ayah, SearchHit, VerseKey};

pub const DEFAULT_QURAN_BASE_URL: &str = "https://api.quran.com/api/v4";

/// Search results per request.
const SEARCH_PAGE_SIZE: u32 = 20;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Deserialize, Debug)]
struct VersesResponse {
    verses: Vec<ApiVerse>,
}

#[derive(Deserialize, Debug)]
struct ApiVerse {
    id: u32,
    verse_key: String,
    #[serde(default)]
    text_uthmani: String,
}

#[derive(Deserialize, Debug)]
struct TranslationsResponse {
    translations: Vec<ApiTranslation>,
}

#[derive(Deserialize, Debug)]
struct ApiTranslation {
    text: String,
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    search: SearchBody,
}

#[derive(Deserialize, Debug)]
struct SearchBody {
    #[serde(default)]
    results: Vec<ApiSearchResult>,
}

#[derive(Deserialize, Debug)]
struct ApiSearchResult {
    verse_key: String,
    text: String,
    #[serde(default)]
    translations: Vec<ApiTranslation>,
}

fn parse_key(raw: &str) -> Result<VerseKey, QuranError> {
    raw.parse()
        .map_err(|e| QuranError::Parse(format!("bad verse_key from API: {e}")))
}

// ============================================================================
// Client
// ============================================================================

pub struct QuranClient {
    base_url: String,
    client: reqwest::Client,
}

impl QuranClient {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_QURAN_BASE_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, QuranError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| QuranError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Quran API response status: {}", status);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(QuranError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Quran API error: {} - {}", status.as_u16(), message);
            return Err(QuranError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| QuranError::Parse(e.to_string()))
    }

    /// Audio file for a whole chapter, with per-word timings.
    pub async fn chapter_audio(&self, reciter: u16, surah: u16) -> Result<ChapterAudio, QuranError> {
        let path = format!("/chapter_recitations/{reciter}/{surah}");
        let response: AudioFileResponse = self
            .get_json(&path, &[("segments", "true".to_string())])
            .await?;
        info!("Fetched audio for surah {} reciter {}", surah, reciter);
        Ok(response.audio_file.into_chapter_audio(reciter, surah))
    }
}

#[async_trait]
impl VerseSource for QuranClient {
    async fn chapter_verses(&self, surah: u16) -> Result<Vec<Ayah>, QuranError> {
        let response: VersesResponse = self
            .get_json(
                "/quran/verses/uthmani",
                &[("chapter_number", surah.to_string())],
            )
            .await?;
        info!("Fetched {} verses for surah {}", response.verses.len(), surah);

        response
            .verses
            .into_iter()
            .map(|v| {
                Ok(Ayah {
                    id: v.id,
                    verse_key: parse_key(&v.verse_key)?,
                    text: v.text_uthmani,
                    translation: None,
                })
            })
            .collect()
    }

    async fn chapter_translation(
        &self,
        surah: u16,
        translation: u16,
    ) -> Result<Vec<String>, QuranError> {
        let path = format!("/quran/translations/{translation}");
        let response: TranslationsResponse = self
            .get_json(&path, &[("chapter_number", surah.to_string())])
            .await?;
        info!(
            "Fetched {} translation rows for surah {} (translation {})",
            response.translations.len(),
            surah,
            translation
        );
        Ok(response
            .translations
            .into_iter()
            .map(|t| strip_markup(&t.text))
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, QuranError> {
        let response: SearchResponse = self
            .get_json(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("size", SEARCH_PAGE_SIZE.to_string()),
                    ("page", "1".to_string()),
                    ("language", "en".to_string()),
                ],
            )
            .await?;
        info!("Search {:?} returned {} results", query, response.search.results.len());

        response
            .search
            .results
            .into_iter()
            .map(|r| {
                Ok(SearchHit {
                    verse_key: parse_key(&r.verse_key)?,
                    text: strip_markup(&r.text),
                    translation: r.translations.first().map(|t| strip_markup(&t.text)),
                })
            })
            .collect()
    }
}
