use std::fmt;

use async_trait::async_trait;

use super::types::{OutputSchema, Prompt};

/// Errors that can occur during provider operations.
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// Provider misconfigured (missing API key, bad URL).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// API returned an error response.
    Api { status: u16, message: String },
    /// Failed to parse the provider's response.
    Parse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill a completion request.
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a Prompt,
    /// The JSON shape the reply must take.
    pub schema: &'a OutputSchema,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Sends one request and returns the model's reply text, which should be
    /// a JSON document matching `request.schema`.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError>;
}
