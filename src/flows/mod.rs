//! # AI Prompt Flows
//!
//! Each flow turns a typed input into a typed output through exactly one model
//! call. A flow declares its prompt, the JSON shape the model must reply with
//! (derived from `Flow::Raw` via `schemars`), and how that reply becomes the
//! final output.
//!
//! ```text
//!   Input ──validate──► Prompt ──complete──► JSON ──parse──► Raw ──finish──► Output
//! ```
//!
//! [`PromptExecutor`] runs any flow. [`FlowRequest`]/[`FlowResponse`] carry
//! every flow as one variant tagged by flow name, so adding a flow means adding
//! a variant.
//!
//! There is no retry. Any failure surfaces as a [`FlowError`], and
//! [`FlowError::user_message`] is what a front end shows.

pub mod recitation;
pub mod remedy;
pub mod summarize;
pub mod tafsir;
pub mod verse_message;

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inference::{CompletionProvider, CompletionRequest, OutputSchema, Prompt, ProviderError};

pub use recitation::{RecitationAnalysis, RecitationFlow, RecitationInput, WordAssessment};
pub use remedy::{Citation, Remedy, RemedyFlow, RemedyInput, Suggestion};
pub use summarize::{SummarizeFlow, SummarizeInput, Summary};
pub use tafsir::{Tafsir, TafsirFlow, TafsirInput};
pub use verse_message::{VerseMessage, VerseMessageFlow, VerseMessageInput};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum FlowError {
    /// The caller's input was rejected before any model call.
    InvalidInput(String),
    /// The model call itself failed.
    Provider(ProviderError),
    /// The model replied, but not with the declared shape.
    Schema(String),
}

impl FlowError {
    /// Text shown to the user. Upstream and schema failures are not
    /// distinguished.
    pub fn user_message(&self) -> String {
        match self {
            FlowError::InvalidInput(msg) => msg.clone(),
            FlowError::Provider(_) | FlowError::Schema(_) => {
                "The AI response could not be generated. Please try again.".to_string()
            }
        }
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            FlowError::Provider(e) => write!(f, "model call failed: {e}"),
            FlowError::Schema(msg) => write!(f, "model output invalid: {msg}"),
        }
    }
}

impl std::error::Error for FlowError {}

impl From<ProviderError> for FlowError {
    fn from(e: ProviderError) -> Self {
        FlowError::Provider(e)
    }
}

// ============================================================================
// Flow trait
// ============================================================================

pub trait Flow {
    /// Flow name; also the schema name sent to the model.
    const NAME: &'static str;
    type Input: Sync;
    /// Shape of the model's JSON reply.
    type Raw: DeserializeOwned + JsonSchema;
    type Output;

    fn validate(_input: &Self::Input) -> Result<(), FlowError> {
        Ok(())
    }

    fn prompt(input: &Self::Input) -> Prompt;

    fn finish(input: &Self::Input, raw: Self::Raw) -> Result<Self::Output, FlowError>;
}

/// Rejects blank required text fields.
pub(crate) fn require(field: &str, value: &str) -> Result<(), FlowError> {
    if value.trim().is_empty() {
        return Err(FlowError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Trims a required string from the model reply, failing if it is blank.
pub(crate) fn required_text(field: &str, value: String) -> Result<String, FlowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FlowError::Schema(format!("`{field}` is empty")));
    }
    Ok(trimmed.to_string())
}

/// Parses a model reply as JSON, tolerating a surrounding ```json fence.
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T, FlowError> {
    let mut body = reply.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        body = rest.strip_suffix("```").unwrap_or(rest).trim();
    }
    serde_json::from_str(body).map_err(|e| FlowError::Schema(e.to_string()))
}

// ============================================================================
// Executor
// ============================================================================

/// The single entry point for running prompt flows against a provider.
pub struct PromptExecutor {
    provider: Arc<dyn CompletionProvider>,
    model: String,
}

impl PromptExecutor {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs one flow: validate, one model call, parse, post-process.
    pub async fn run<F: Flow>(&self, input: &F::Input) -> Result<F::Output, FlowError> {
        let request_id = Uuid::new_v4();
        F::validate(input)?;

        let prompt = F::prompt(input);
        let schema = OutputSchema::for_type::<F::Raw>(F::NAME);
        info!(
            "[{}] flow={} provider={} model={}",
            request_id,
            F::NAME,
            self.provider.name(),
            self.model
        );

        let reply = self
            .provider
            .complete(CompletionRequest {
                model: &self.model,
                prompt: &prompt,
                schema: &schema,
            })
            .await
            .map_err(|e| {
                warn!("[{}] {} failed: {}", request_id, F::NAME, e);
                FlowError::Provider(e)
            })?;
        debug!("[{}] raw reply: {}", request_id, reply);

        let raw: F::Raw = parse_reply(&reply).inspect_err(|e| {
            warn!("[{}] {} returned unusable output: {}", request_id, F::NAME, e);
        })?;
        let output = F::finish(input, raw)?;
        info!("[{}] flow {} complete", request_id, F::NAME);
        Ok(output)
    }

    /// Runs whichever flow `request` names.
    pub async fn execute(&self, request: &FlowRequest) -> Result<FlowResponse, FlowError> {
        Ok(match request {
            FlowRequest::Summarize(input) => FlowResponse::Summarize(self.run::<SummarizeFlow>(input).await?),
            FlowRequest::Tafsir(input) => FlowResponse::Tafsir(self.run::<TafsirFlow>(input).await?),
            FlowRequest::VerseMessage(input) => {
                FlowResponse::VerseMessage(self.run::<VerseMessageFlow>(input).await?)
            }
            FlowRequest::SpiritualRemedy(input) => {
                FlowResponse::SpiritualRemedy(self.run::<RemedyFlow>(input).await?)
            }
            FlowRequest::RecitationAnalysis(input) => {
                FlowResponse::RecitationAnalysis(self.run::<RecitationFlow>(input).await?)
            }
        })
    }
}

// ============================================================================
// Tagged request/response
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "flow", content = "input", rename_all = "snake_case")]
pub enum FlowRequest {
    Summarize(SummarizeInput),
    Tafsir(TafsirInput),
    VerseMessage(VerseMessageInput),
    SpiritualRemedy(RemedyInput),
    RecitationAnalysis(RecitationInput),
}

impl FlowRequest {
    pub fn name(&self) -> &'static str {
        match self {
            FlowRequest::Summarize(_) => SummarizeFlow::NAME,
            FlowRequest::Tafsir(_) => TafsirFlow::NAME,
            FlowRequest::VerseMessage(_) => VerseMessageFlow::NAME,
            FlowRequest::SpiritualRemedy(_) => RemedyFlow::NAME,
            FlowRequest::RecitationAnalysis(_) => RecitationFlow::NAME,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "flow", content = "output", rename_all = "snake_case")]
pub enum FlowResponse {
    Summarize(Summary),
    Tafsir(Tafsir),
    VerseMessage(VerseMessage),
    SpiritualRemedy(Remedy),
    RecitationAnalysis(RecitationAnalysis),
}
