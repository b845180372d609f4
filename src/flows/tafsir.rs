//! Verse interpretation in Arabic.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Flow, FlowError, require, required_text};
use crate::inference::Prompt;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TafsirInput {
    pub surah_name: String,
    pub verse_number: u16,
    pub arabic_text: String,
    pub translation: String,
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct TafsirReply {
    /// The interpretation, written in Arabic.
    pub tafsir: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Tafsir {
    pub tafsir: String,
}

pub struct TafsirFlow;

impl Flow for TafsirFlow {
    const NAME: &'static str = "tafsir";
    type Input = TafsirInput;
    type Raw = TafsirReply;
    type Output = Tafsir;

    fn validate(input: &TafsirInput) -> Result<(), FlowError> {
        require("surah_name", &input.surah_name)?;
        require("arabic_text", &input.arabic_text)?;
        if input.verse_number == 0 {
            return Err(FlowError::InvalidInput("verse_number starts at 1".to_string()));
        }
        Ok(())
    }

    fn prompt(input: &TafsirInput) -> Prompt {
        Prompt::new(
            "You are a scholar of Quranic exegesis. Explain the verse in Modern Standard \
             Arabic, drawing on the classical tafsir literature. Respond in Arabic only.",
        )
        .text(format!(
            "Surah {}, verse {}\n\nArabic: {}\n\nEnglish: {}",
            input.surah_name, input.verse_number, input.arabic_text, input.translation
        ))
    }

    fn finish(_input: &TafsirInput, raw: TafsirReply) -> Result<Tafsir, FlowError> {
        Ok(Tafsir {
            tafsir: required_text("tafsir", raw.tafsir)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_verse_zero() {
        let input = TafsirInput {
            surah_name: "Al-Fatihah".to_string(),
            verse_number: 0,
            arabic_text: "بِسْمِ".to_string(),
            translation: String::new(),
        };
        assert!(matches!(TafsirFlow::validate(&input), Err(FlowError::InvalidInput(_))));
    }

    #[test]
    fn test_prompt_carries_both_texts() {
        let input = TafsirInput {
            surah_name: "Al-Ikhlas".to_string(),
            verse_number: 1,
            arabic_text: "قُلْ هُوَ ٱللَّهُ أَحَدٌ".to_string(),
            translation: "Say, He is Allah, the One.".to_string(),
        };
        let text = TafsirFlow::prompt(&input).joined_text();
        assert!(text.contains("Surah Al-Ikhlas, verse 1"));
        assert!(text.contains("أَحَدٌ"));
        assert!(text.contains("the One"));
    }

    #[test]
    fn test_blank_tafsir_is_schema_error() {
        let input = TafsirInput {
            surah_name: "Al-Ikhlas".to_string(),
            verse_number: 1,
            arabic_text: "قُلْ".to_string(),
            translation: String::new(),
        };
        let raw = TafsirReply {
            tafsir: String::new(),
        };
        assert!(matches!(TafsirFlow::finish(&input, raw), Err(FlowError::Schema(_))));
    }
}
