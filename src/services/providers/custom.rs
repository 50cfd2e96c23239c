/// Custom hosted LLM provider
///
/// OpenAI-compatible wire format, but the vision endpoint can only fetch
/// images over HTTP: inline bytes are not accepted, so callers must stage
/// uploads to a public URL before this provider sees them.
use reqwest::Client as HttpClient;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::services::providers::{extract_json_content, ChatResponse, ImageSource, LlmProvider};

#[derive(Clone)]
pub struct CustomProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    vision_model: String,
    text_model: String,
}

impl CustomProvider {
    pub fn new(api_key: String, api_url: String, vision_model: String, text_model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            vision_model,
            text_model,
        }
    }

    async fn chat(&self, body: Value) -> AppResult<Value> {
        let url = format!("{}/chat/completions", self.api_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
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
impl LlmProvider for CustomProvider {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn requires_public_url(&self) -> bool {
        true
    }

    async fn analyze_image(&self, image: &ImageSource, prompt: &str) -> AppResult<Value> {
        // Fail before issuing any request: bytes cannot be converted into
        // something this provider accepts, and the failover loop must be able
        // to skip to a provider that can handle them.
        let Some(image_url) = &image.url else {
            return Err(AppError::Provider {
                provider: self.name(),
                message: "requires a publicly accessible image url".to_string(),
            });
        };

        let body = json!({
            "model": self.vision_model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": image_url } }
                ]
            }],
            "response_format": { "type": "json_object" }
        });

        let payload = self.chat(body).await?;
        tracing::info!(provider = self.name(), "Vision analysis response received");
        Ok(payload)
    }

    async fn generate_text(&self, prompt: &str) -> AppResult<Value> {
        let body = json!({
            "model": self.text_model,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": { "type": "json_object" }
        });

        let payload = self.chat(body).await?;
        tracing::info!(provider = self.name(), "Text generation response received");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_provider() -> CustomProvider {
        CustomProvider::new(
            "test_key".to_string(),
            "http://test.local/v1".to_string(),
            "vision-model".to_string(),
            "text-model".to_string(),
        )
    }

    #[tokio::test]
    async fn test_analyze_image_rejects_bytes_only_input() {
        let provider = create_test_provider();
        let image = ImageSource::from_bytes(vec![0xFF, 0xD8, 0xFF]);

        // Fails before any network call is attempted.
        let err = provider.analyze_image(&image, "prompt").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider {
                provider: "custom",
                ..
            }
        ));
    }

    #[test]
    fn test_requires_public_url() {
        assert!(create_test_provider().requires_public_url());
    }
}
