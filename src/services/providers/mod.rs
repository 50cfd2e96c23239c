/// LLM provider abstraction
///
/// This module provides a pluggable architecture for vision/text LLM
/// backends. Each provider exposes the same two capabilities — image
/// analysis and text generation — and either returns parsed JSON or fails,
/// so the failover layer can treat them uniformly.
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub mod custom;
pub mod openai;

pub use custom::CustomProvider;
pub use openai::OpenAiProvider;

/// Image handed to a vision provider: inline bytes, a public URL, or both
#[derive(Debug, Clone, Default)]
pub struct ImageSource {
    pub bytes: Option<Vec<u8>>,
    pub url: Option<String>,
}

impl ImageSource {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes),
            url: None,
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            bytes: None,
            url: Some(url.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_none() && self.url.is_none()
    }
}

/// Trait for LLM providers
///
/// Both calls must return the model's payload as parsed JSON. Partial or
/// unparseable output is an error; the failover layer treats any error as
/// grounds to try the next provider.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name used for configuration lookup and logging
    fn name(&self) -> &'static str;

    /// True when the provider can only fetch images over HTTP and cannot
    /// accept inline bytes
    fn requires_public_url(&self) -> bool {
        false
    }

    /// Analyze an image against a prompt, returning the model's JSON payload
    async fn analyze_image(&self, image: &ImageSource, prompt: &str) -> AppResult<Value>;

    /// Run a text-only generation, returning the model's JSON payload
    async fn generate_text(&self, prompt: &str) -> AppResult<Value>;
}

/// Chat-completions response envelope shared by both providers
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessage {
    content: String,
}

/// Pulls the first choice's content out of a chat response and parses it as
/// JSON. Models are asked for `json_object` output, so anything else counts
/// as a provider failure.
pub(crate) fn extract_json_content(
    provider: &'static str,
    response: ChatResponse,
) -> AppResult<Value> {
    let content = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| AppError::Provider {
            provider,
            message: "response contained no choices".to_string(),
        })?;

    serde_json::from_str(&content).map_err(|e| AppError::Provider {
        provider,
        message: format!("response content is not valid JSON: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_content_parses_nested_payload() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "{\"skin_type\": \"oily\"}"}}]
        }))
        .unwrap();

        let value = extract_json_content("openai", response).unwrap();
        assert_eq!(value["skin_type"], "oily");
    }

    #[test]
    fn test_extract_json_content_rejects_empty_choices() {
        let response: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();

        let err = extract_json_content("openai", response).unwrap_err();
        assert!(matches!(err, AppError::Provider { .. }));
    }

    #[test]
    fn test_extract_json_content_rejects_prose() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "I am sorry, I cannot help with that."}}]
        }))
        .unwrap();

        assert!(extract_json_content("custom", response).is_err());
    }

    #[test]
    fn test_image_source_is_empty() {
        assert!(ImageSource::default().is_empty());
        assert!(!ImageSource::from_bytes(vec![1, 2, 3]).is_empty());
        assert!(!ImageSource::from_url("https://example.com/face.jpg").is_empty());
    }
}
