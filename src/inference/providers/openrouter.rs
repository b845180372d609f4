//! OpenRouter provider (hosted, bearer-token auth).

use async_trait::async_trait;

use super::chat::{build_request, post_chat};
use crate::inference::{CompletionProvider, CompletionRequest, ProviderError};

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter API provider using chat completions with structured output
pub struct OpenRouterProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Creates a new OpenRouter provider.
    ///
    /// # Arguments
    /// * `api_key` - OpenRouter API key
    /// * `base_url` - Optional custom base URL (defaults to OpenRouter's API)
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::Config(
                "OpenRouter API key is empty. Set OPENROUTER_API_KEY or [openrouter] api_key"
                    .to_string(),
            ));
        }
        Ok(Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        let body = build_request(&request);
        post_chat(
            &self.client,
            "OpenRouter",
            &self.base_url,
            Some(&self.api_key),
            &body,
        )
        .await
    }
}
