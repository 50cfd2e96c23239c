use std::time::Duration;

use serde_json::Value;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::SkinAnalysis;
use crate::prompts;
use crate::services::providers::{CustomProvider, ImageSource, LlmProvider, OpenAiProvider};

/// Provider registry with deterministic failover.
///
/// Providers are tried in a fixed order: the configured primary first, then
/// every other registered provider in registration order. Each attempt is
/// bounded by a timeout, so total worst-case latency is
/// `providers * attempt_timeout`. An attempt only succeeds when the call
/// returns AND its payload validates; partial results count as failures.
pub struct LlmService {
    providers: Vec<Box<dyn LlmProvider>>,
    primary: usize,
    attempt_timeout: Duration,
}

impl std::fmt::Debug for LlmService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmService")
            .field("providers", &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("primary", &self.primary)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl LlmService {
    /// Creates a service over an explicit provider list.
    ///
    /// Zero providers is a configuration error: it is raised here, once, at
    /// construction, never per-request. An unknown primary name falls back to
    /// the first registered provider.
    pub fn new(
        providers: Vec<Box<dyn LlmProvider>>,
        primary_name: &str,
        attempt_timeout: Duration,
    ) -> AppResult<Self> {
        if providers.is_empty() {
            return Err(AppError::Configuration(
                "no LLM providers configured; set OPENAI_API_KEY or CUSTOM_LLM_API_KEY"
                    .to_string(),
            ));
        }

        let primary = match providers.iter().position(|p| p.name() == primary_name) {
            Some(idx) => idx,
            None => {
                tracing::warn!(
                    requested = %primary_name,
                    using = providers[0].name(),
                    "Primary provider not available, falling back to first configured"
                );
                0
            }
        };

        Ok(Self {
            providers,
            primary,
            attempt_timeout,
        })
    }

    /// Registers every provider whose API key is configured
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let mut providers: Vec<Box<dyn LlmProvider>> = Vec::new();

        if let Some(key) = &config.openai_api_key {
            providers.push(Box::new(OpenAiProvider::new(
                key.clone(),
                config.openai_base_url.clone(),
                config.openai_vision_model.clone(),
                config.openai_text_model.clone(),
            )));
            tracing::info!("OpenAI provider initialized");
        }

        if let Some(key) = &config.custom_llm_api_key {
            providers.push(Box::new(CustomProvider::new(
                key.clone(),
                config.custom_llm_base_url.clone(),
                config.custom_vision_model.clone(),
                config.custom_text_model.clone(),
            )));
            tracing::info!("Custom LLM provider initialized");
        }

        Self::new(
            providers,
            &config.primary_llm_provider,
            Duration::from_secs(config.provider_timeout_secs),
        )
    }

    pub fn primary_name(&self) -> &'static str {
        self.providers[self.primary].name()
    }

    pub fn primary_requires_url(&self) -> bool {
        self.providers[self.primary].requires_public_url()
    }

    fn failover_order(&self) -> impl Iterator<Item = &dyn LlmProvider> {
        let primary = self.primary;
        std::iter::once(&self.providers[primary])
            .chain(
                self.providers
                    .iter()
                    .enumerate()
                    .filter(move |(idx, _)| *idx != primary)
                    .map(|(_, p)| p),
            )
            .map(|p| p.as_ref())
    }

    /// Produces a validated skin analysis from the image, falling back
    /// across providers until one yields complete structured output
    pub async fn analyze_skin(&self, image: &ImageSource) -> AppResult<SkinAnalysis> {
        let prompt = prompts::skin_analysis_prompt();
        let mut failures: Vec<String> = Vec::new();

        for provider in self.failover_order() {
            let attempt = async {
                let raw = provider.analyze_image(image, &prompt).await?;
                SkinAnalysis::from_llm(raw)
            };

            match tokio::time::timeout(self.attempt_timeout, attempt).await {
                Ok(Ok(analysis)) => {
                    if !failures.is_empty() {
                        tracing::info!(
                            provider = provider.name(),
                            "Fallback provider succeeded for skin analysis"
                        );
                    }
                    return Ok(analysis);
                }
                Ok(Err(e)) => {
                    tracing::error!(
                        provider = provider.name(),
                        error = %e,
                        "Skin analysis attempt failed"
                    );
                    failures.push(format!("{}: {}", provider.name(), e));
                }
                Err(_) => {
                    tracing::error!(
                        provider = provider.name(),
                        timeout_secs = self.attempt_timeout.as_secs(),
                        "Skin analysis attempt timed out"
                    );
                    failures.push(format!("{}: timed out", provider.name()));
                }
            }
        }

        Err(AppError::ProvidersExhausted(failures.join("; ")))
    }

    /// Generates recommendation JSON for an already-filtered product subset,
    /// with the same failover behavior as the vision call
    pub async fn generate_recommendations(
        &self,
        analysis: &SkinAnalysis,
        products_json: &str,
    ) -> AppResult<Value> {
        let prompt = prompts::recommendation_prompt(analysis, products_json);
        let mut failures: Vec<String> = Vec::new();

        for provider in self.failover_order() {
            match tokio::time::timeout(self.attempt_timeout, provider.generate_text(&prompt)).await
            {
                Ok(Ok(payload)) => {
                    if !failures.is_empty() {
                        tracing::info!(
                            provider = provider.name(),
                            "Fallback provider succeeded for recommendation generation"
                        );
                    }
                    return Ok(payload);
                }
                Ok(Err(e)) => {
                    tracing::error!(
                        provider = provider.name(),
                        error = %e,
                        "Recommendation generation attempt failed"
                    );
                    failures.push(format!("{}: {}", provider.name(), e));
                }
                Err(_) => {
                    tracing::error!(
                        provider = provider.name(),
                        timeout_secs = self.attempt_timeout.as_secs(),
                        "Recommendation generation attempt timed out"
                    );
                    failures.push(format!("{}: timed out", provider.name()));
                }
            }
        }

        Err(AppError::ProvidersExhausted(failures.join("; ")))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{valid_analysis_payload, ScriptedProvider};
    use super::*;
    use crate::models::SkinType;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_zero_providers_is_a_configuration_error() {
        let err = LlmService::new(Vec::new(), "openai", TIMEOUT).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_unknown_primary_falls_back_to_first_configured() {
        let providers: Vec<Box<dyn LlmProvider>> = vec![
            Box::new(ScriptedProvider::failing("alpha", "down")),
            Box::new(ScriptedProvider::failing("beta", "down")),
        ];

        let service = LlmService::new(providers, "missing", TIMEOUT).unwrap();
        assert_eq!(service.primary_name(), "alpha");
    }

    #[tokio::test]
    async fn test_fallback_result_matches_secondary_standalone_output() {
        let primary = ScriptedProvider::failing("alpha", "connection refused");
        let secondary = ScriptedProvider::succeeding(
            "beta",
            valid_analysis_payload(),
            json!({"recommendations": []}),
        );
        let primary_calls = primary.call_counter();
        let secondary_calls = secondary.call_counter();

        let service = LlmService::new(
            vec![Box::new(primary), Box::new(secondary)],
            "alpha",
            TIMEOUT,
        )
        .unwrap();

        let analysis = service
            .analyze_skin(&ImageSource::from_url("https://example.com/face.jpg"))
            .await
            .unwrap();

        assert_eq!(analysis.skin_type, SkinType::Oily);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_primary_is_tried_first_even_when_registered_last() {
        let first = ScriptedProvider::failing("alpha", "down");
        let second = ScriptedProvider::failing("beta", "down");

        let service =
            LlmService::new(vec![Box::new(first), Box::new(second)], "beta", TIMEOUT).unwrap();

        let err = service
            .analyze_skin(&ImageSource::from_url("https://example.com/face.jpg"))
            .await
            .unwrap_err();

        // The aggregate error preserves attempt order: primary first.
        match err {
            AppError::ProvidersExhausted(message) => {
                let beta_pos = message.find("beta").unwrap();
                let alpha_pos = message.find("alpha").unwrap();
                assert!(beta_pos < alpha_pos);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_all_providers_failing_yields_aggregate_error() {
        let service = LlmService::new(
            vec![
                Box::new(ScriptedProvider::failing("alpha", "auth failure")),
                Box::new(ScriptedProvider::failing("beta", "timeout upstream")),
            ],
            "alpha",
            TIMEOUT,
        )
        .unwrap();

        let err = service
            .analyze_skin(&ImageSource::from_url("https://example.com/face.jpg"))
            .await
            .unwrap_err();

        match err {
            AppError::ProvidersExhausted(message) => {
                assert!(message.contains("alpha"));
                assert!(message.contains("beta"));
                assert!(message.contains("auth failure"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_analysis_payload_triggers_fallback() {
        // Primary answers with well-formed JSON that fails validation.
        let primary = ScriptedProvider::succeeding(
            "alpha",
            json!({"skin_type": "oily", "concerns": [], "age_category": "teen"}),
            json!({}),
        );
        let secondary = ScriptedProvider::succeeding(
            "beta",
            valid_analysis_payload(),
            json!({"recommendations": []}),
        );

        let service = LlmService::new(
            vec![Box::new(primary), Box::new(secondary)],
            "alpha",
            TIMEOUT,
        )
        .unwrap();

        let analysis = service
            .analyze_skin(&ImageSource::from_url("https://example.com/face.jpg"))
            .await
            .unwrap();
        assert_eq!(analysis.skin_type, SkinType::Oily);
    }

    #[tokio::test]
    async fn test_generate_recommendations_fails_over_too() {
        let primary = ScriptedProvider::failing("alpha", "overloaded");
        let secondary = ScriptedProvider::succeeding(
            "beta",
            valid_analysis_payload(),
            json!({"recommendations": [{"product_id": "prod_002", "match_score": 88}]}),
        );

        let service = LlmService::new(
            vec![Box::new(primary), Box::new(secondary)],
            "alpha",
            TIMEOUT,
        )
        .unwrap();

        let analysis = SkinAnalysis::from_llm(valid_analysis_payload()).unwrap();
        let payload = service
            .generate_recommendations(&analysis, "[]")
            .await
            .unwrap();

        assert_eq!(
            payload["recommendations"][0]["product_id"].as_str(),
            Some("prod_002")
        );
    }
}
