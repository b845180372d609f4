use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use schemars::JsonSchema;
use serde_json::Value;

/// A piece of the user turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// Base64-encoded audio plus its container format (`wav`, `mp3`, ...).
    Audio { data: String, format: String },
}

/// A system instruction and the user content that goes with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub parts: Vec<ContentPart>,
}

impl Prompt {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            parts: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Text(text.into()));
        self
    }

    pub fn audio(mut self, bytes: &[u8], format: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Audio {
            data: STANDARD.encode(bytes),
            format: format.into(),
        });
        self
    }

    /// True when every part is text, so the turn can go out as a plain string.
    pub fn is_text_only(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, ContentPart::Text(_)))
    }

    /// All text parts joined by blank lines.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::Audio { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Declared output shape for a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

impl OutputSchema {
    pub fn for_type<T: JsonSchema>(name: &str) -> Self {
        let root = schemars::schema_for!(T);
        Self {
            name: name.to_string(),
            schema: serde_json::to_value(root).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Reply {
        /// The answer
        answer: String,
        score: Option<u8>,
    }

    #[test]
    fn test_prompt_builder() {
        let prompt = Prompt::new("system").text("one").text("two");
        assert!(prompt.is_text_only());
        assert_eq!(prompt.joined_text(), "one\n\ntwo");
    }

    #[test]
    fn test_audio_part_is_base64() {
        let prompt = Prompt::new("system").text("listen").audio(b"RIFF", "wav");
        assert!(!prompt.is_text_only());
        assert_eq!(
            prompt.parts[1],
            ContentPart::Audio {
                data: "UklGRg==".to_string(),
                format: "wav".to_string()
            }
        );
        assert_eq!(prompt.joined_text(), "listen");
    }

    #[test]
    fn test_output_schema_lists_required_fields() {
        let schema = OutputSchema::for_type::<Reply>("reply");
        assert_eq!(schema.name, "reply");
        assert_eq!(schema.schema["type"], "object");
        assert!(schema.schema["properties"]["answer"].is_object());
        let required = schema.schema["required"].as_array().unwrap();
        assert!(required.iter().any(|r| r == "answer"));
        assert!(!required.iter().any(|r| r == "score"));
    }
}
