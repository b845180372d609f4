//! # Quran Content
//!
//! Reference tables, verse lookup, translations, search and audio.
//!
//! - [`data`]: static surah/juz/reciter/translation/theme tables
//! - [`text`]: Arabic normalization and digit helpers
//! - [`source`]: the `VerseSource` seam and `QuranError`
//! - [`client`]: quran.com API client
//! - [`resolver`]: local-first verse resolution and translation merge
//! - [`audio`]: chapter audio and word highlighting

pub mod audio;
pub mod client;
pub mod data;
pub mod resolver;
pub mod source;
pub mod text;
pub mod types;

pub use client::QuranClient;
pub use resolver::{ChapterView, VerseResolver};
pub use source::{QuranError, VerseSource};
pub use types::{Ayah, Reciter, Revelation, SearchHit, Surah, ThemeOption, TranslationOption, VerseKey};
