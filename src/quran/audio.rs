//! # Recitation Audio
//!
//! Chapter audio files and the per-word timing segments used to highlight the
//! word currently being recited.

use serde::{Deserialize, Serialize};

/// One word's slice of the audio, in milliseconds from the start of the file.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSegment {
    /// Word position within the verse, as numbered by the API.
    pub position: u32,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Where a verse sits in the chapter audio.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct VerseTiming {
    pub verse_key: String,
    pub from_ms: u64,
    pub to_ms: u64,
    pub segments: Vec<WordSegment>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChapterAudio {
    pub reciter: u16,
    pub surah: u16,
    pub audio_url: String,
    pub format: Option<String>,
    pub timings: Vec<VerseTiming>,
}

/// The word under the playhead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCursor {
    pub verse_key: String,
    pub position: u32,
}

/// Finds the word being recited at `position_ms`. Returns `None` between
/// verses or when the audio carries no word segments.
pub fn active_word(timings: &[VerseTiming], position_ms: u64) -> Option<WordCursor> {
    let verse = timings
        .iter()
        .find(|t| t.from_ms <= position_ms && position_ms < t.to_ms)?;
    verse
        .segments
        .iter()
        .find(|s| s.start_ms <= position_ms && position_ms < s.end_ms)
        .map(|s| WordCursor {
            verse_key: verse.verse_key.clone(),
            position: s.position,
        })
}

// ============================================================================
// API wire format
// ============================================================================

#[derive(Deserialize, Debug)]
pub(super) struct AudioFileResponse {
    pub audio_file: ApiAudioFile,
}

#[derive(Deserialize, Debug)]
pub(super) struct ApiAudioFile {
    pub audio_url: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub timestamps: Vec<ApiTimestamp>,
}

#[derive(Deserialize, Debug)]
pub(super) struct ApiTimestamp {
    pub verse_key: String,
    pub timestamp_from: u64,
    pub timestamp_to: u64,
    /// `[position, start_ms, end_ms]` triples; malformed rows are dropped.
    #[serde(default)]
    pub segments: Vec<Vec<u64>>,
}

impl ApiAudioFile {
    pub(super) fn into_chapter_audio(self, reciter: u16, surah: u16) -> ChapterAudio {
        let timings = self
            .timestamps
            .into_iter()
            .map(|t| VerseTiming {
                verse_key: t.verse_key,
                from_ms: t.timestamp_from,
                to_ms: t.timestamp_to,
                segments: t
                    .segments
                    .iter()
                    .filter_map(|row| match row.as_slice() {
                        [position, start, end, ..] => Some(WordSegment {
                            position: *position as u32,
                            start_ms: *start,
                            end_ms: *end,
                        }),
                        _ => None,
                    })
                    .collect(),
            })
            .collect();
        ChapterAudio {
            reciter,
            surah,
            audio_url: self.audio_url,
            format: self.format,
            timings,
        }
    }
}
