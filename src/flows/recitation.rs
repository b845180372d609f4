//! Recitation feedback: the model listens to a recording of a verse and
//! marks each word as correctly pronounced or not.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Flow, FlowError, require, required_text};
use crate::inference::Prompt;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecitationInput {
    /// The verse as it should be recited.
    pub original_text: String,
    /// Raw audio bytes; base64 on the wire.
    #[serde(serialize_with = "to_base64", deserialize_with = "from_base64")]
    pub audio: Vec<u8>,
    /// Container format understood by the model (`wav`, `mp3`).
    pub audio_format: String,
}

fn to_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn from_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct WordAssessment {
    /// The word from the original text.
    pub word: String,
    /// Whether it was pronounced correctly, tajweed included.
    pub correct: bool,
    /// What went wrong, if anything.
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct RecitationReply {
    /// Overall feedback for the reciter.
    pub feedback: String,
    /// One entry per word of the original text, in order.
    #[serde(default)]
    pub tajweed: Vec<WordAssessment>,
    /// Overall score from 0 to 100.
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecitationAnalysis {
    pub feedback: String,
    pub words: Vec<WordAssessment>,
    pub score: u8,
}

/// Share of correct words as a percentage, rounded. Zero when there are no words.
pub fn score_from_words(words: &[WordAssessment]) -> u8 {
    if words.is_empty() {
        return 0;
    }
    let correct = words.iter().filter(|w| w.correct).count();
    (100.0 * correct as f64 / words.len() as f64).round() as u8
}

pub struct RecitationFlow;

impl Flow for RecitationFlow {
    const NAME: &'static str = "recitation_analysis";
    type Input = RecitationInput;
    type Raw = RecitationReply;
    type Output = RecitationAnalysis;

    fn validate(input: &RecitationInput) -> Result<(), FlowError> {
        require("original_text", &input.original_text)?;
        require("audio_format", &input.audio_format)?;
        if input.audio.is_empty() {
            return Err(FlowError::InvalidInput("audio recording is empty".to_string()));
        }
        Ok(())
    }

    fn prompt(input: &RecitationInput) -> Prompt {
        Prompt::new(
            "You are a Quran recitation teacher. Listen to the recording and compare it \
             with the original verse. Assess every word for pronunciation and tajweed, \
             give encouraging feedback, and score the recitation from 0 to 100.",
        )
        .text(format!("Original verse:\n{}", input.original_text))
        .audio(&input.audio, input.audio_format.clone())
    }

    fn finish(_input: &RecitationInput, raw: RecitationReply) -> Result<RecitationAnalysis, FlowError> {
        let score = match raw.score.filter(|s| s.is_finite()) {
            Some(s) => s.round().clamp(0.0, 100.0) as u8,
            None => score_from_words(&raw.tajweed),
        };
        Ok(RecitationAnalysis {
            feedback: required_text("feedback", raw.feedback)?,
            words: raw.tajweed,
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(word: &str, correct: bool) -> WordAssessment {
        WordAssessment {
            word: word.to_string(),
            correct,
            note: None,
        }
    }

    fn input() -> RecitationInput {
        RecitationInput {
            original_text: "قُلْ هُوَ ٱللَّهُ أَحَدٌ".to_string(),
            audio: vec![1, 2, 3],
            audio_format: "wav".to_string(),
        }
    }

    #[test]
    fn test_score_fallback_three_of_four() {
        let raw = RecitationReply {
            feedback: "Good effort.".to_string(),
            tajweed: vec![word("قُلْ", true), word("هُوَ", true), word("ٱللَّهُ", false), word("أَحَدٌ", true)],
            score: None,
        };
        let analysis = RecitationFlow::finish(&input(), raw).unwrap();
        assert_eq!(analysis.score, 75);
        assert_eq!(analysis.words.len(), 4);
    }

    #[test]
    fn test_score_fallback_no_words() {
        assert_eq!(score_from_words(&[]), 0);
    }

    #[test]
    fn test_score_rounds() {
        let words = [word("a", true), word("b", true), word("c", false)];
        assert_eq!(score_from_words(&words), 67);
    }

    #[test]
    fn test_explicit_score_is_clamped() {
        let raw = RecitationReply {
            feedback: "ok".to_string(),
            tajweed: vec![],
            score: Some(140.0),
        };
        assert_eq!(RecitationFlow::finish(&input(), raw).unwrap().score, 100);

        let raw = RecitationReply {
            feedback: "ok".to_string(),
            tajweed: vec![word("a", true)],
            score: Some(-5.0),
        };
        assert_eq!(RecitationFlow::finish(&input(), raw).unwrap().score, 0);
    }

    #[test]
    fn test_fractional_score_rounds() {
        let raw: RecitationReply =
            crate::flows::parse_reply(r#"{"feedback":"ok","tajweed":[],"score":87.5}"#).unwrap();
        let analysis = RecitationFlow::finish(&input(), raw).unwrap();
        assert_eq!(analysis.score, 88);
        assert_eq!(analysis.feedback, "ok");
    }

    #[test]
    fn test_integer_score_still_accepted() {
        let raw: RecitationReply =
            crate::flows::parse_reply(r#"{"feedback":"ok","score":92}"#).unwrap();
        assert_eq!(RecitationFlow::finish(&input(), raw).unwrap().score, 92);
    }

    #[test]
    fn test_non_finite_score_uses_words() {
        let raw = RecitationReply {
            feedback: "ok".to_string(),
            tajweed: vec![word("a", true), word("b", false)],
            score: Some(f64::NAN),
        };
        assert_eq!(RecitationFlow::finish(&input(), raw).unwrap().score, 50);
    }

    #[test]
    fn test_prompt_includes_audio() {
        let prompt = RecitationFlow::prompt(&input());
        assert!(!prompt.is_text_only());
        assert!(prompt.joined_text().contains("أَحَدٌ"));
    }

    #[test]
    fn test_empty_audio_rejected() {
        let mut input = input();
        input.audio.clear();
        assert!(matches!(RecitationFlow::validate(&input), Err(FlowError::InvalidInput(_))));
    }

    #[test]
    fn test_audio_serializes_as_base64() {
        let value = serde_json::to_value(input()).unwrap();
        assert_eq!(value["audio"], "AQID");
        let back: RecitationInput = serde_json::from_value(value).unwrap();
        assert_eq!(back.audio, vec![1, 2, 3]);
    }
}
