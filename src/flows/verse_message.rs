//! A short reflection on a single verse.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Flow, FlowError, require, required_text};
use crate::inference::Prompt;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerseMessageInput {
    pub surah_name: String,
    pub verse_number: u16,
    pub arabic_text: String,
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct VerseMessageReply {
    /// A brief reflective message the reader can carry through the day.
    pub message: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VerseMessage {
    pub message: String,
}

pub struct VerseMessageFlow;

impl Flow for VerseMessageFlow {
    const NAME: &'static str = "verse_message";
    type Input = VerseMessageInput;
    type Raw = VerseMessageReply;
    type Output = VerseMessage;

    fn validate(input: &VerseMessageInput) -> Result<(), FlowError> {
        require("arabic_text", &input.arabic_text)?;
        if input.verse_number == 0 {
            return Err(FlowError::InvalidInput("verse_number starts at 1".to_string()));
        }
        Ok(())
    }

    fn prompt(input: &VerseMessageInput) -> Prompt {
        Prompt::new(
            "Write a short, warm reflection (at most four sentences) on the given verse \
             of the Quran. Speak to the reader directly.",
        )
        .text(format!(
            "Surah {}, verse {}:\n{}",
            input.surah_name, input.verse_number, input.arabic_text
        ))
    }

    fn finish(_input: &VerseMessageInput, raw: VerseMessageReply) -> Result<VerseMessage, FlowError> {
        Ok(VerseMessage {
            message: required_text("message", raw.message)?,
        })
    }
}
