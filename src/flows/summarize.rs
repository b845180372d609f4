//! Chapter summary.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Flow, FlowError, require, required_text};
use crate::inference::Prompt;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SummarizeInput {
    pub surah_name: String,
    /// All verses of the chapter, concatenated.
    pub verses_text: String,
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct SummaryReply {
    /// A concise summary of the chapter's themes and message.
    pub summary: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub summary: String,
}

pub struct SummarizeFlow;

impl Flow for SummarizeFlow {
    const NAME: &'static str = "summarize";
    type Input = SummarizeInput;
    type Raw = SummaryReply;
    type Output = Summary;

    fn validate(input: &SummarizeInput) -> Result<(), FlowError> {
        require("surah_name", &input.surah_name)?;
        require("verses_text", &input.verses_text)
    }

    fn prompt(input: &SummarizeInput) -> Prompt {
        Prompt::new(
            "You summarize chapters of the Quran for a general reader. Describe the \
             main themes and guidance in two or three short paragraphs. Stay faithful \
             to the text and avoid sectarian positions.",
        )
        .text(format!(
            "Summarize Surah {}.\n\nVerses:\n{}",
            input.surah_name, input.verses_text
        ))
    }

    fn finish(_input: &SummarizeInput, raw: SummaryReply) -> Result<Summary, FlowError> {
        Ok(Summary {
            summary: required_text("summary", raw.summary)?,
        })
    }
}
