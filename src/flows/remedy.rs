//! Spiritual remedy: verses, a reflection and a supplication for a feeling,
//! plus a surah and reciter to listen to.
//!
//! The model names the surah and reciter in free text. Those names are looked
//! up in the static tables; anything that does not match falls back to Ya-Sin
//! recited by Mohamed al-Tablawi, and the suggestion records that it did.

use log::{info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Flow, FlowError, require, required_text};
use crate::inference::Prompt;
use crate::quran::data::{fallback_reciter, fallback_surah, find_reciter_by_name, find_surah_by_name};
use crate::quran::{Reciter, Surah, VerseKey};

pub const MAX_CITATIONS: usize = 3;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RemedyInput {
    /// Free-text description of how the user feels.
    pub feeling: String,
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct CitationReply {
    /// Verse key in "<surah number>:<verse number>" form, e.g. "94:5".
    pub reference: String,
    /// Transliterated surah name, e.g. "Ash-Sharh".
    pub surah_name: String,
    pub arabic_text: String,
    /// English translation of the verse.
    pub translation: String,
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct RemedyReply {
    /// One to three verses that speak to the feeling.
    pub verses: Vec<CitationReply>,
    /// A passage connecting the verses to what the user described.
    pub interpretation: String,
    /// A short supplication the user can say.
    pub supplication: String,
    /// Transliterated name of one surah to listen to.
    pub suggested_surah: String,
    /// Full name of a well-known reciter.
    pub suggested_reciter: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Citation {
    /// `None` when the model's reference is not a real verse.
    pub key: Option<VerseKey>,
    pub reference: String,
    pub surah_name: String,
    pub arabic_text: String,
    pub translation: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub surah: &'static Surah,
    pub reciter: &'static Reciter,
    pub surah_matched: bool,
    pub reciter_matched: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Remedy {
    pub citations: Vec<Citation>,
    pub interpretation: String,
    pub supplication: String,
    pub suggestion: Suggestion,
}

/// Maps model-suggested names onto the static tables.
pub fn resolve_suggestion(surah_name: &str, reciter_name: &str) -> Suggestion {
    let surah = find_surah_by_name(surah_name);
    let reciter = find_reciter_by_name(reciter_name);
    if surah.is_none() {
        warn!("Unrecognized surah suggestion {:?}, using fallback", surah_name);
    }
    if reciter.is_none() {
        warn!("Unrecognized reciter suggestion {:?}, using fallback", reciter_name);
    }
    Suggestion {
        surah_matched: surah.is_some(),
        reciter_matched: reciter.is_some(),
        surah: surah.unwrap_or_else(fallback_surah),
        reciter: reciter.unwrap_or_else(fallback_reciter),
    }
}

fn to_citation(raw: CitationReply) -> Citation {
    let key = raw.reference.trim().parse::<VerseKey>().ok();
    Citation {
        key,
        reference: raw.reference.trim().to_string(),
        surah_name: raw.surah_name.trim().to_string(),
        arabic_text: raw.arabic_text.trim().to_string(),
        translation: raw.translation.trim().to_string(),
    }
}

pub struct RemedyFlow;

impl Flow for RemedyFlow {
    const NAME: &'static str = "spiritual_remedy";
    type Input = RemedyInput;
    type Raw = RemedyReply;
    type Output = Remedy;

    fn validate(input: &RemedyInput) -> Result<(), FlowError> {
        require("feeling", &input.feeling)
    }

    fn prompt(input: &RemedyInput) -> Prompt {
        Prompt::new(
            "You offer comfort from the Quran. Given how someone feels, choose one to \
             three relevant verses (with Arabic text and English translation), write a \
             short interpretation connecting them to the feeling, give a supplication, \
             and suggest one surah to listen to and a well-known reciter.",
        )
        .text(format!("How I feel: {}", input.feeling.trim()))
    }

    fn finish(_input: &RemedyInput, raw: RemedyReply) -> Result<Remedy, FlowError> {
        if raw.verses.is_empty() {
            return Err(FlowError::Schema("no verses cited".to_string()));
        }
        if raw.verses.len() > MAX_CITATIONS {
            info!("Model cited {} verses, keeping {}", raw.verses.len(), MAX_CITATIONS);
        }
        let citations = raw.verses.into_iter().take(MAX_CITATIONS).map(to_citation).collect();

        Ok(Remedy {
            citations,
            interpretation: required_text("interpretation", raw.interpretation)?,
            supplication: required_text("supplication", raw.supplication)?,
            suggestion: resolve_suggestion(&raw.suggested_surah, &raw.suggested_reciter),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quran::data::{FALLBACK_RECITER_ID, FALLBACK_SURAH_ID};

    fn citation(reference: &str) -> CitationReply {
        CitationReply {
            reference: reference.to_string(),
            surah_name: "Ash-Sharh".to_string(),
            arabic_text: "فَإِنَّ مَعَ ٱلْعُسْرِ يُسْرًا".to_string(),
            translation: "So, surely with hardship comes ease.".to_string(),
        }
    }

    fn reply(verses: Vec<CitationReply>, surah: &str, reciter: &str) -> RemedyReply {
        RemedyReply {
            verses,
            interpretation: "Ease follows hardship.".to_string(),
            supplication: "O Allah, grant me ease.".to_string(),
            suggested_surah: surah.to_string(),
            suggested_reciter: reciter.to_string(),
        }
    }

    fn input() -> RemedyInput {
        RemedyInput {
            feeling: "overwhelmed".to_string(),
        }
    }

    #[test]
    fn test_unrecognized_names_fall_back() {
        let suggestion = resolve_suggestion("The Chapter of Feelings", "Someone Unknown");
        assert_eq!(suggestion.surah.id, FALLBACK_SURAH_ID);
        assert_eq!(suggestion.reciter.id, FALLBACK_RECITER_ID);
        assert!(!suggestion.surah_matched);
        assert!(!suggestion.reciter_matched);
    }

    #[test]
    fn test_names_match_case_insensitively() {
        let suggestion = resolve_suggestion("al-kahf", "MISHARI RASHID AL-AFASY");
        assert_eq!(suggestion.surah.id, 18);
        assert_eq!(suggestion.reciter.id, 7);
        assert!(suggestion.surah_matched && suggestion.reciter_matched);
    }

    #[test]
    fn test_spelling_variants_match() {
        assert_eq!(resolve_suggestion("Surah Yasin", "").surah.id, 36);
        assert_eq!(resolve_suggestion("Ar-Rahman", "").surah.id, 55);
    }

    #[test]
    fn test_citations_are_capped() {
        let raw = reply(
            vec![citation("94:5"), citation("94:6"), citation("2:286"), citation("13:28")],
            "Ash-Sharh",
            "Mishari Rashid al-Afasy",
        );
        let remedy = RemedyFlow::finish(&input(), raw).unwrap();
        assert_eq!(remedy.citations.len(), MAX_CITATIONS);
        assert_eq!(remedy.citations[0].key, Some(VerseKey::new(94, 5).unwrap()));
        assert_eq!(remedy.suggestion.surah.id, 94);
    }

    #[test]
    fn test_no_citations_is_schema_error() {
        let raw = reply(vec![], "Ya-Sin", "");
        assert!(matches!(RemedyFlow::finish(&input(), raw), Err(FlowError::Schema(_))));
    }

    #[test]
    fn test_bad_reference_keeps_citation_without_key() {
        let raw = reply(vec![citation("94:99")], "Ya-Sin", "");
        let remedy = RemedyFlow::finish(&input(), raw).unwrap();
        assert_eq!(remedy.citations[0].key, None);
        assert_eq!(remedy.citations[0].reference, "94:99");
    }
}
