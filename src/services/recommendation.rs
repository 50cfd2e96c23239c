use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::catalog::Catalog;
use crate::db::{AnalyticsSink, CounterKey};
use crate::error::{AppError, AppResult};
use crate::models::recommendation::MAX_RECOMMENDATIONS;
use crate::models::{
    MatchBreakdown, Product, ProductRecommendation, RecommendationResponse, RoutineAdvice,
};
use crate::services::llm::LlmService;
use crate::services::providers::ImageSource;

/// End-to-end recommendation pipeline.
///
/// One sequential pass per request: analyze, filter, generate, reconcile,
/// then emit analytics. A step failure ends the request; only the provider
/// layer retries internally.
pub struct RecommendationService {
    llm: LlmService,
    catalog: Arc<Catalog>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl RecommendationService {
    pub fn new(llm: LlmService, catalog: Arc<Catalog>, analytics: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            llm,
            catalog,
            analytics,
        }
    }

    /// True when uploads must be staged to a public URL before analysis
    pub fn primary_requires_url(&self) -> bool {
        self.llm.primary_requires_url()
    }

    pub async fn recommend(&self, image: &ImageSource) -> AppResult<RecommendationResponse> {
        if image.is_empty() {
            return Err(AppError::InvalidInput(
                "either an image upload or an image url must be provided".to_string(),
            ));
        }

        tracing::info!(
            has_bytes = image.bytes.is_some(),
            has_url = image.url.is_some(),
            "Starting recommendation pipeline"
        );

        let analysis = self.llm.analyze_skin(image).await?;
        tracing::info!(
            skin_type = ?analysis.skin_type,
            concerns = analysis.concerns.len(),
            "Skin analysis completed"
        );

        let offered = self.catalog.filter(&analysis);
        if offered.is_empty() {
            tracing::warn!(
                skin_type = ?analysis.skin_type,
                "No catalog products match the analyzed profile"
            );
            return Err(AppError::NoSuitableProducts);
        }

        let products_json = serde_json::to_string_pretty(&offered)
            .map_err(|e| AppError::Internal(format!("failed to serialize catalog subset: {}", e)))?;

        let payload = self
            .llm
            .generate_recommendations(&analysis, &products_json)
            .await?;

        let reconciled = reconcile(payload, &offered)?;

        // Best-effort analytics; the sink logs and swallows its own failures.
        let today = Utc::now().date_naive();
        for rec in &reconciled.recommendations {
            self.analytics
                .record(CounterKey::Product(rec.product.id.clone()));
            self.analytics.record(CounterKey::Day(today));
        }

        tracing::info!(
            accepted = reconciled.recommendations.len(),
            "Recommendations generated"
        );

        Ok(RecommendationResponse {
            skin_analysis: analysis,
            recommendations: reconciled.recommendations,
            general_tips: reconciled.general_tips,
            routine_advice: reconciled.routine_advice,
            ingredients_to_look_for: reconciled.ingredients_to_look_for,
            ingredients_to_avoid: reconciled.ingredients_to_avoid,
        })
    }
}

#[derive(Debug)]
struct ReconciledPayload {
    recommendations: Vec<ProductRecommendation>,
    general_tips: Vec<String>,
    routine_advice: Option<RoutineAdvice>,
    ingredients_to_look_for: Vec<String>,
    ingredients_to_avoid: Vec<String>,
}

/// Merges the generator's untrusted payload with the trusted catalog subset.
///
/// The model's JSON is never deserialized straight into the response: only
/// entries referencing a product that was actually offered survive, scores
/// are clamped into [0, 100], and at most [`MAX_RECOMMENDATIONS`] candidates
/// are considered, in the order the model returned them.
fn reconcile(payload: Value, offered: &[&Product]) -> AppResult<ReconciledPayload> {
    let entries = payload
        .get("recommendations")
        .and_then(Value::as_array)
        .ok_or(AppError::InvalidRecommendations)?;

    let by_id: HashMap<&str, &Product> = offered.iter().map(|p| (p.id.as_str(), *p)).collect();

    let mut recommendations = Vec::new();
    for entry in entries.iter().take(MAX_RECOMMENDATIONS) {
        let Some(product_id) = entry.get("product_id").and_then(Value::as_str) else {
            tracing::warn!("Recommendation entry missing product_id, skipping");
            continue;
        };

        let Some(product) = by_id.get(product_id) else {
            tracing::warn!(
                product_id = %product_id,
                "Recommended product was not offered to the generator, skipping"
            );
            continue;
        };

        let match_score = entry
            .get("match_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            .clamp(0.0, 100.0);

        let match_breakdown = entry
            .get("match_breakdown")
            .and_then(|v| serde_json::from_value::<MatchBreakdown>(v.clone()).ok());

        let justification = entry
            .get("justification")
            .and_then(Value::as_str)
            .unwrap_or("Suitable for your skin profile")
            .to_string();

        recommendations.push(ProductRecommendation {
            product: (*product).clone(),
            match_score,
            match_breakdown,
            justification,
            expected_benefits: string_list(entry.get("expected_benefits")),
        });
    }

    if recommendations.is_empty() {
        return Err(AppError::InvalidRecommendations);
    }

    Ok(ReconciledPayload {
        recommendations,
        general_tips: string_list(payload.get("general_tips")),
        routine_advice: payload
            .get("routine_advice")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
        ingredients_to_look_for: string_list(payload.get("ingredients_to_look_for")),
        ingredients_to_avoid: string_list(payload.get("ingredients_to_avoid")),
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
