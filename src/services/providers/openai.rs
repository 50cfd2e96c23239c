/// OpenAI-compatible provider
///
/// Speaks the standard chat-completions API with `json_object` response
/// format. Accepts either inline image bytes (sent as a base64 data URL) or
/// a plain image URL.
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::services::providers::{extract_json_content, ChatResponse, ImageSource, LlmProvider};

const MAX_TOKENS: u32 = 1000;

#[derive(Clone)]
pub struct OpenAiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    vision_model: String,
    text_model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, api_url: String, vision_model: String, text_model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            vision_model,
            text_model,
        }
    }

    /// Builds the image content part, preferring inline bytes over a URL
    fn image_part(&self, image: &ImageSource) -> AppResult<Value> {
        if let Some(bytes) = &image.bytes {
            let encoded = STANDARD.encode(bytes);
            Ok(json!({
                "type": "image_url",
                "image_url": { "url": format!("data:image/jpeg;base64,{}", encoded) }
            }))
        } else if let Some(url) = &image.url {
            Ok(json!({
                "type": "image_url",
                "image_url": { "url": url }
            }))
        } else {
            Err(AppError::InvalidInput(
                "either image bytes or an image url must be provided".to_string(),
            ))
        }
    }

    async fn chat(&self, body: Value) -> AppResult<Value> {
        let url = format!("{}/chat/completions", self.api_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider {
                provider: self.name(),
                message: format!("API returned status {}: {}", status, body),
            });
        }

        let chat: ChatResponse = response.json().await?;
        extract_json_content(self.name(), chat)
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn analyze_image(&self, image: &ImageSource, prompt: &str) -> AppResult<Value> {
        let image_part = self.image_part(image)?;

        let body = json!({
            "model": self.vision_model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    image_part
                ]
            }],
            "response_format": { "type": "json_object" },
            "max_tokens": MAX_TOKENS
        });

        let payload = self.chat(body).await?;
        tracing::info!(provider = self.name(), "Vision analysis response received");
        Ok(payload)
    }

    async fn generate_text(&self, prompt: &str) -> AppResult<Value> {
        let body = json!({
            "model": self.text_model,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": { "type": "json_object" },
            "max_tokens": MAX_TOKENS
        });

        let payload = self.chat(body).await?;
        tracing::info!(provider = self.name(), "Text generation response received");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_provider() -> OpenAiProvider {
        OpenAiProvider::new(
            "test_key".to_string(),
            "http://test.local/v1".to_string(),
            "vision-model".to_string(),
            "text-model".to_string(),
        )
    }

    #[test]
    fn test_image_part_prefers_inline_bytes() {
        let provider = create_test_provider();
        let image = ImageSource {
            bytes: Some(vec![0xFF, 0xD8, 0xFF]),
            url: Some("https://example.com/face.jpg".to_string()),
        };

        let part = provider.image_part(&image).unwrap();
        let url = part["image_url"]["url"].as_str().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_image_part_uses_url_when_no_bytes() {
        let provider = create_test_provider();
        let image = ImageSource::from_url("https://example.com/face.jpg");

        let part = provider.image_part(&image).unwrap();
        assert_eq!(
            part["image_url"]["url"].as_str(),
            Some("https://example.com/face.jpg")
        );
    }

    #[test]
    fn test_image_part_rejects_empty_source() {
        let provider = create_test_provider();
        let err = provider.image_part(&ImageSource::default()).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
