//! OpenAI-compatible `/chat/completions` wire format with structured output.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::{CompletionRequest, ContentPart, ProviderError};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(super) enum Role {
    System,
    User,
}

/// A plain string for text-only turns, an array of parts otherwise.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub(super) enum MessageContent {
    Text(String),
    Parts(Vec<ApiContentPart>),
}

#[derive(Serialize, Debug)]
#[serde(tag = "type")]
pub(super) enum ApiContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "input_audio")]
    InputAudio { input_audio: InputAudio },
}

#[derive(Serialize, Debug)]
pub(super) struct InputAudio {
    data: String,
    format: String,
}

#[derive(Serialize, Debug)]
pub(super) struct ChatMessage {
    pub(super) role: Role,
    pub(super) content: MessageContent,
}

#[derive(Serialize, Debug)]
pub(super) struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Serialize, Debug)]
pub(super) struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str, // always "json_schema"
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize, Debug)]
pub(super) struct ChatRequest {
    pub(super) model: String,
    pub(super) messages: Vec<ChatMessage>,
    pub(super) response_format: ResponseFormat,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Deserialize, Debug)]
pub(super) struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// Translation Layer
// ============================================================================

fn part_to_api(part: &ContentPart) -> ApiContentPart {
    match part {
        ContentPart::Text(text) => ApiContentPart::Text { text: text.clone() },
        ContentPart::Audio { data, format } => ApiContentPart::InputAudio {
            input_audio: InputAudio {
                data: data.clone(),
                format: format.clone(),
            },
        },
    }
}

pub(super) fn build_request(request: &CompletionRequest<'_>) -> ChatRequest {
    let prompt = request.prompt;
    let user = if prompt.is_text_only() {
        MessageContent::Text(prompt.joined_text())
    } else {
        MessageContent::Parts(prompt.parts.iter().map(part_to_api).collect())
    };

    ChatRequest {
        model: request.model.to_string(),
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: MessageContent::Text(prompt.system.clone()),
            },
            ChatMessage {
                role: Role::User,
                content: user,
            },
        ],
        response_format: ResponseFormat {
            format_type: "json_schema",
            json_schema: JsonSchemaFormat {
                name: request.schema.name.clone(),
                strict: false,
                schema: request.schema.schema.clone(),
            },
        },
    }
}

/// First choice's message text. An empty or missing reply is a parse error.
pub(super) fn extract_content(response: ChatResponse) -> Result<String, ProviderError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    if content.trim().is_empty() {
        return Err(ProviderError::Parse("response contained no content".to_string()));
    }
    Ok(content)
}

/// POSTs `body` to `{base_url}/chat/completions` and returns the reply text.
pub(super) async fn post_chat(
    client: &reqwest::Client,
    provider: &str,
    base_url: &str,
    api_key: Option<&str>,
    body: &ChatRequest,
) -> Result<String, ProviderError> {
    let json_body = serde_json::to_string(body)
        .map_err(|e| ProviderError::Parse(format!("Request serialization failed: {e}")))?;
    info!(
        "{} request: model={}, schema={}, body_bytes={}",
        provider,
        body.model,
        body.response_format.json_schema.name,
        json_body.len()
    );

    let mut builder = client
        .post(format!("{}/chat/completions", base_url.trim_end_matches('/')))
        .header("Content-Type", "application/json")
        .body(json_body);
    if let Some(key) = api_key {
        builder = builder.header("Authorization", format!("Bearer {key}"));
    }

    let response = builder
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    debug!("{} response status: {}", provider, response.status());

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let err_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("{} API error: {} - {}", provider, status, err_body);
        return Err(ProviderError::Api {
            status,
            message: err_body,
        });
    }

    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))?;
    let content = extract_content(parsed)?;
    info!("{} reply received: {} chars", provider, content.len());
    Ok(content)
}
