use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::data::find_surah;

/// Where a surah was revealed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revelation {
    #[serde(rename = "makkah")]
    Makkah,
    #[serde(rename = "madinah")]
    Madinah,
}

impl Revelation {
    pub fn label(self) -> &'static str {
        match self {
            Revelation::Makkah => "Makkah",
            Revelation::Madinah => "Madinah",
        }
    }
}

/// Immutable reference record for one of the 114 chapters.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Surah {
    pub id: u16,
    pub name: &'static str,
    pub arabic_name: &'static str,
    pub meaning: &'static str,
    pub revelation: Revelation,
    pub verse_count: u16,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Reciter {
    pub id: u16,
    pub name: &'static str,
    pub style: Option<&'static str>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TranslationOption {
    pub id: u16,
    pub name: &'static str,
    pub author: &'static str,
    pub language: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ThemeOption {
    pub id: &'static str,
    pub name: &'static str,
}

// ============================================================================
// Verse keys
// ============================================================================

/// A `"<surah>:<verse>"` reference that is known to point at a real verse.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct VerseKey {
    pub surah: u16,
    pub verse: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseKeyError(pub String);

impl fmt::Display for VerseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid verse key: {}", self.0)
    }
}

impl std::error::Error for VerseKeyError {}

impl VerseKey {
    /// Builds a key after checking the surah exists and the verse is in range.
    pub fn new(surah: u16, verse: u16) -> Result<Self, VerseKeyError> {
        let Some(info) = find_surah(surah) else {
            return Err(VerseKeyError(format!("{surah}:{verse} (surah must be 1-114)")));
        };
        if verse == 0 || verse > info.verse_count {
            return Err(VerseKeyError(format!(
                "{surah}:{verse} ({} has {} verses)",
                info.name, info.verse_count
            )));
        }
        Ok(Self { surah, verse })
    }

    /// Position of the verse in the whole mushaf, 1-based (1:1 is 1, 114:6 is 6236).
    pub fn global_id(&self) -> u32 {
        let before: u32 = (1..self.surah)
            .filter_map(find_surah)
            .map(|s| s.verse_count as u32)
            .sum();
        before + self.verse as u32
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.surah, self.verse)
    }
}

impl FromStr for VerseKey {
    type Err = VerseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (surah, verse) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| VerseKeyError(s.to_string()))?;
        let surah = surah.parse().map_err(|_| VerseKeyError(s.to_string()))?;
        let verse = verse.parse().map_err(|_| VerseKeyError(s.to_string()))?;
        VerseKey::new(surah, verse)
    }
}

impl TryFrom<String> for VerseKey {
    type Error = VerseKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VerseKey> for String {
    fn from(key: VerseKey) -> Self {
        key.to_string()
    }
}

// ============================================================================
// Verses
// ============================================================================

/// A verse with its Uthmani text and, once merged, its translation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Ayah {
    pub id: u32,
    pub verse_key: VerseKey,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl Ayah {
    pub fn verse_number(&self) -> u16 {
        self.verse_key.verse
    }
}

/// One hit from a text search.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub verse_key: VerseKey,
    pub text: String,
    pub translation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_key() {
        let key: VerseKey = "2:255".parse().unwrap();
        assert_eq!(key, VerseKey { surah: 2, verse: 255 });
        assert_eq!(key.to_string(), "2:255");
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!("0:1".parse::<VerseKey>().is_err());
        assert!("115:1".parse::<VerseKey>().is_err());
        assert!("1:8".parse::<VerseKey>().is_err());
        assert!("1:0".parse::<VerseKey>().is_err());
        assert!("abc".parse::<VerseKey>().is_err());
        assert!("1-1".parse::<VerseKey>().is_err());
    }

    #[test]
    fn test_global_id() {
        assert_eq!(VerseKey::new(1, 1).unwrap().global_id(), 1);
        assert_eq!(VerseKey::new(2, 1).unwrap().global_id(), 8);
        assert_eq!(VerseKey::new(114, 6).unwrap().global_id(), 6236);
    }

    #[test]
    fn test_verse_key_serde_as_string() {
        let key = VerseKey::new(36, 58).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#""36:58""#);
        let back: VerseKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<VerseKey>(r#""36:99""#).is_err());
    }
}
