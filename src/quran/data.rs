//! # Reference Data
//!
//! Static tables: the 114 surahs, Juz boundaries, reciters, translations,
//! reader themes, and the handful of chapters whose text ships with the crate.
//!
//! The surah table is generated by `build.rs` from `data/surahs.tsv`.

use super::types::{Ayah, Reciter, Revelation, Surah, ThemeOption, TranslationOption, VerseKey};

include!(concat!(env!("OUT_DIR"), "/surahs.rs"));

/// First verse of each Juz, as (surah, verse).
pub const JUZ_STARTS: [(u16, u16); 30] = [
    (1, 1),
    (2, 142),
    (2, 253),
    (3, 93),
    (4, 24),
    (4, 148),
    (5, 82),
    (6, 111),
    (7, 88),
    (8, 41),
    (9, 93),
    (11, 6),
    (12, 53),
    (15, 1),
    (17, 1),
    (18, 75),
    (21, 1),
    (23, 1),
    (25, 21),
    (27, 56),
    (29, 46),
    (33, 31),
    (36, 28),
    (39, 32),
    (41, 47),
    (46, 1),
    (51, 31),
    (58, 1),
    (67, 1),
    (78, 1),
];

pub static RECITERS: &[Reciter] = &[
    Reciter { id: 1, name: "AbdulBaset AbdulSamad", style: Some("Mujawwad") },
    Reciter { id: 2, name: "AbdulBaset AbdulSamad", style: Some("Murattal") },
    Reciter { id: 3, name: "Abdur-Rahman as-Sudais", style: None },
    Reciter { id: 4, name: "Abu Bakr al-Shatri", style: None },
    Reciter { id: 5, name: "Hani ar-Rifai", style: None },
    Reciter { id: 6, name: "Mahmoud Khalil Al-Husary", style: None },
    Reciter { id: 7, name: "Mishari Rashid al-Afasy", style: None },
    Reciter { id: 8, name: "Mohamed Siddiq al-Minshawi", style: Some("Mujawwad") },
    Reciter { id: 9, name: "Mohamed Siddiq al-Minshawi", style: Some("Murattal") },
    Reciter { id: 10, name: "Sa'ud ash-Shuraym", style: None },
    Reciter { id: 11, name: "Mohamed al-Tablawi", style: None },
    Reciter { id: 12, name: "Mahmoud Khalil Al-Husary", style: Some("Muallim") },
];

pub static TRANSLATIONS: &[TranslationOption] = &[
    TranslationOption { id: 131, name: "The Clear Quran", author: "Dr. Mustafa Khattab", language: "english" },
    TranslationOption { id: 20, name: "Saheeh International", author: "Saheeh International", language: "english" },
    TranslationOption { id: 85, name: "Abdel Haleem", author: "M.A.S. Abdel Haleem", language: "english" },
    TranslationOption { id: 19, name: "Pickthall", author: "Mohammed Marmaduke William Pickthall", language: "english" },
    TranslationOption { id: 22, name: "Yusuf Ali", author: "Abdullah Yusuf Ali", language: "english" },
    TranslationOption { id: 203, name: "Al-Hilali & Khan", author: "Muhammad Taqi-ud-Din al-Hilali & Muhammad Muhsin Khan", language: "english" },
    TranslationOption { id: 33, name: "Indonesian Islamic Affairs Ministry", author: "Kementerian Agama", language: "indonesian" },
    TranslationOption { id: 31, name: "Hamidullah", author: "Muhammad Hamidullah", language: "french" },
    TranslationOption { id: 77, name: "Diyanet Isleri", author: "Diyanet Isleri", language: "turkish" },
];

pub static THEMES: &[ThemeOption] = &[
    ThemeOption { id: "light", name: "Light" },
    ThemeOption { id: "dark", name: "Dark" },
    ThemeOption { id: "sepia", name: "Sepia" },
    ThemeOption { id: "emerald", name: "Emerald" },
];

/// Chapters that are available without a network round trip. Surah 3 is a
/// leading subset of its 200 verses.
static LOCAL_VERSES: &[(u16, &[&str])] = &[
    (
        1,
        &[
            "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ",
            "ٱلْحَمْدُ لِلَّهِ رَبِّ ٱلْعَٰلَمِينَ",
            "ٱلرَّحْمَٰنِ ٱلرَّحِيمِ",
            "مَٰلِكِ يَوْمِ ٱلدِّينِ",
            "إِيَّاكَ نَعْبُدُ وَإِيَّاكَ نَسْتَعِينُ",
            "ٱهْدِنَا ٱلصِّرَٰطَ ٱلْمُسْتَقِيمَ",
            "صِرَٰطَ ٱلَّذِينَ أَنْعَمْتَ عَلَيْهِمْ غَيْرِ ٱلْمَغْضُوبِ عَلَيْهِمْ وَلَا ٱلضَّآلِّينَ",
        ],
    ),
    (
        3,
        &[
            "الٓمٓ",
            "ٱللَّهُ لَآ إِلَٰهَ إِلَّا هُوَ ٱلْحَىُّ ٱلْقَيُّومُ",
            "نَزَّلَ عَلَيْكَ ٱلْكِتَٰبَ بِٱلْحَقِّ مُصَدِّقًا لِّمَا بَيْنَ يَدَيْهِ وَأَنزَلَ ٱلتَّوْرَىٰةَ وَٱلْإِنجِيلَ",
            "مِن قَبْلُ هُدًى لِّلنَّاسِ وَأَنزَلَ ٱلْفُرْقَانَ ۗ إِنَّ ٱلَّذِينَ كَفَرُوا۟ بِـَٔايَٰتِ ٱللَّهِ لَهُمْ عَذَابٌ شَدِيدٌ ۗ وَٱللَّهُ عَزِيزٌ ذُو ٱنتِقَامٍ",
            "إِنَّ ٱللَّهَ لَا يَخْفَىٰ عَلَيْهِ شَىْءٌ فِى ٱلْأَرْضِ وَلَا فِى ٱلسَّمَآءِ",
        ],
    ),
];

// ============================================================================
// Lookups
// ============================================================================

pub fn find_surah(id: u16) -> Option<&'static Surah> {
    if id == 0 {
        return None;
    }
    SURAHS.get(id as usize - 1)
}

pub fn find_reciter(id: u16) -> Option<&'static Reciter> {
    RECITERS.iter().find(|r| r.id == id)
}

pub fn find_translation(id: u16) -> Option<&'static TranslationOption> {
    TRANSLATIONS.iter().find(|t| t.id == id)
}

pub fn find_theme(id: &str) -> Option<&'static ThemeOption> {
    THEMES.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

/// Finds a surah by transliterated name, English meaning, or Arabic name.
///
/// Matching is case-insensitive; a looser pass also ignores a leading
/// "Surah"/"Surat", the Arabic article, and punctuation, so "Yasin",
/// "Ya-Sin" and "Surah Ya Sin" all land on 36.
pub fn find_surah_by_name(name: &str) -> Option<&'static Surah> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(s) = SURAHS.iter().find(|s| {
        s.name.eq_ignore_ascii_case(trimmed)
            || s.meaning.eq_ignore_ascii_case(trimmed)
            || s.arabic_name == trimmed
    }) {
        return Some(s);
    }
    let wanted = loose_key(trimmed);
    SURAHS
        .iter()
        .find(|s| loose_key(s.name) == wanted || loose_key(s.meaning) == wanted)
}

/// Finds a reciter by name, case-insensitively. The first table entry wins
/// when a reciter has several styles.
pub fn find_reciter_by_name(name: &str) -> Option<&'static Reciter> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(r) = RECITERS.iter().find(|r| r.name.eq_ignore_ascii_case(trimmed)) {
        return Some(r);
    }
    let wanted = loose_key(trimmed);
    RECITERS.iter().find(|r| loose_key(r.name) == wanted)
}

const ARTICLES: [&str; 9] = ["al", "an", "ar", "as", "at", "ad", "adh", "ash", "az"];

fn loose_key(name: &str) -> String {
    let mut rest = name.trim().to_lowercase();
    for prefix in ["surah ", "surat ", "sura "] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped.to_string();
            break;
        }
    }
    for article in ARTICLES {
        let with_dash = format!("{article}-");
        if let Some(stripped) = rest.strip_prefix(&with_dash) {
            rest = stripped.to_string();
            break;
        }
    }
    rest.chars().filter(|c| c.is_alphanumeric()).collect()
}

// ============================================================================
// Juz
// ============================================================================

/// Verse range of a Juz: first verse and the first verse of the next Juz
/// (exclusive), as (surah, verse) pairs.
fn juz_bounds(juz: u8) -> Option<((u16, u16), (u16, u16))> {
    if !(1..=30).contains(&juz) {
        return None;
    }
    let start = JUZ_STARTS[juz as usize - 1];
    let end = JUZ_STARTS.get(juz as usize).copied().unwrap_or((115, 0));
    Some((start, end))
}

/// The Juz (1-30) that a surah spans, ascending.
pub fn juz_of(surah: &Surah) -> Vec<u8> {
    let first = (surah.id, 1);
    let last = (surah.id, surah.verse_count);
    (1..=30u8)
        .filter(|&j| match juz_bounds(j) {
            Some((start, end)) => start <= last && end > first,
            None => false,
        })
        .collect()
}

/// The Juz containing a verse.
pub fn juz_of_verse(key: &VerseKey) -> u8 {
    let pos = (key.surah, key.verse);
    JUZ_STARTS
        .iter()
        .rposition(|start| *start <= pos)
        .map(|i| i as u8 + 1)
        .unwrap_or(1)
}

/// Summary of one Juz: where it starts, where it ends, and which surahs it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JuzInfo {
    pub number: u8,
    pub start: VerseKey,
    pub end: VerseKey,
    pub surahs: Vec<u16>,
}

pub fn juz(number: u8) -> Option<JuzInfo> {
    let (start, next) = juz_bounds(number)?;
    let end = if next.1 > 1 {
        (next.0, next.1 - 1)
    } else {
        let prev = find_surah(next.0 - 1)?;
        (prev.id, prev.verse_count)
    };
    let surahs = (start.0..=end.0).collect();
    Some(JuzInfo {
        number,
        start: VerseKey::new(start.0, start.1).ok()?,
        end: VerseKey::new(end.0, end.1).ok()?,
        surahs,
    })
}

// ============================================================================
// Embedded verses
// ============================================================================

/// Verses for `surah` if they ship with the crate.
pub fn local_verses(surah: u16) -> Option<Vec<Ayah>> {
    let (_, texts) = LOCAL_VERSES.iter().find(|(id, _)| *id == surah)?;
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let key = VerseKey::new(surah, i as u16 + 1).ok()?;
            Some(Ayah {
                id: key.global_id(),
                verse_key: key,
                text: (*text).to_string(),
                translation: None,
            })
        })
        .collect()
}

/// Default surah suggested when a model names one that is not in the table (Ya-Sin).
pub const FALLBACK_SURAH_ID: u16 = 36;
/// Default reciter suggested when a model names one that is not in the table.
pub const FALLBACK_RECITER_ID: u16 = 11;

pub fn fallback_surah() -> &'static Surah {
    // The generated table always holds all 114 entries
    &SURAHS[FALLBACK_SURAH_ID as usize - 1]
}

pub fn fallback_reciter() -> &'static Reciter {
    find_reciter(FALLBACK_RECITER_ID).unwrap_or(&RECITERS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_complete() {
        assert_eq!(SURAHS.len(), 114);
        let total: u32 = SURAHS.iter().map(|s| s.verse_count as u32).sum();
        assert_eq!(total, 6236);
        assert_eq!(find_surah(36).unwrap().name, "Ya-Sin");
        assert_eq!(find_surah(2).unwrap().revelation, Revelation::Madinah);
        assert!(find_surah(0).is_none());
        assert!(find_surah(115).is_none());
    }

    #[test]
    fn test_juz_of_surah() {
        assert_eq!(juz_of(find_surah(1).unwrap()), vec![1]);
        assert_eq!(juz_of(find_surah(2).unwrap()), vec![1, 2, 3]);
        assert_eq!(juz_of(find_surah(18).unwrap()), vec![15, 16]);
        assert_eq!(juz_of(find_surah(114).unwrap()), vec![30]);
        // Every surah lands in at least one Juz.
        assert!(SURAHS.iter().all(|s| !juz_of(s).is_empty()));
    }

    #[test]
    fn test_juz_of_verse() {
        assert_eq!(juz_of_verse(&VerseKey::new(2, 141).unwrap()), 1);
        assert_eq!(juz_of_verse(&VerseKey::new(2, 142).unwrap()), 2);
        assert_eq!(juz_of_verse(&VerseKey::new(114, 1).unwrap()), 30);
    }

    #[test]
    fn test_juz_info() {
        let first = juz(1).unwrap();
        assert_eq!(first.start.to_string(), "1:1");
        assert_eq!(first.end.to_string(), "2:141");
        assert_eq!(first.surahs, vec![1, 2]);

        let fourteenth = juz(14).unwrap();
        assert_eq!(fourteenth.end.to_string(), "16:128");

        let last = juz(30).unwrap();
        assert_eq!(last.end.to_string(), "114:6");
        assert_eq!(last.surahs.len(), 37);
        assert!(juz(0).is_none());
        assert!(juz(31).is_none());
    }

    #[test]
    fn test_find_surah_by_name_variants() {
        for name in ["Ya-Sin", "ya-sin", "Yasin", "Surah Ya Sin", "yasin"] {
            assert_eq!(find_surah_by_name(name).map(|s| s.id), Some(36), "{name}");
        }
        assert_eq!(find_surah_by_name("Baqarah").map(|s| s.id), Some(2));
        assert_eq!(find_surah_by_name("The Cow").map(|s| s.id), Some(2));
        assert_eq!(find_surah_by_name("الكهف").map(|s| s.id), Some(18));
        assert!(find_surah_by_name("Not A Surah").is_none());
        assert!(find_surah_by_name("  ").is_none());
    }

    #[test]
    fn test_find_reciter_by_name() {
        assert_eq!(find_reciter_by_name("mishari rashid al-afasy").map(|r| r.id), Some(7));
        assert_eq!(find_reciter_by_name("Mahmoud Khalil Al-Husary").map(|r| r.id), Some(6));
        assert!(find_reciter_by_name("Unknown Qari").is_none());
    }

    #[test]
    fn test_local_verses() {
        let fatiha = local_verses(1).unwrap();
        assert_eq!(fatiha.len(), 7);
        assert_eq!(fatiha[0].verse_key.to_string(), "1:1");
        assert_eq!(fatiha[6].id, 7);
        let imran = local_verses(3).unwrap();
        assert_eq!(imran[0].id, 294);
        assert!(local_verses(2).is_none());
    }

    #[test]
    fn test_fallbacks_exist_in_tables() {
        assert!(find_surah(FALLBACK_SURAH_ID).is_some());
        assert!(find_reciter(FALLBACK_RECITER_ID).is_some());
    }
}
