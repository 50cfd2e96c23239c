use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::product::{Product, SkinConcern, SkinType};

/// Maximum number of concerns kept from a skin analysis
pub const MAX_CONCERNS: usize = 3;

/// Maximum number of products recommended per request
pub const MAX_RECOMMENDATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    Teen,
    YoungAdult,
    Mature,
    Senior,
}

/// Structured result of the vision analysis step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinAnalysis {
    pub skin_type: SkinType,
    pub concerns: Vec<SkinConcern>,
    pub age_category: AgeCategory,
    #[serde(default)]
    pub observations: Vec<String>,
}

impl SkinAnalysis {
    /// Builds a validated analysis from raw provider JSON.
    ///
    /// The payload must carry a known skin type, age category and at least one
    /// known concern. Duplicate concerns are removed (first occurrence wins)
    /// and the list is capped at [`MAX_CONCERNS`]. Anything less counts as a
    /// failure of the provider that produced it.
    pub fn from_llm(payload: serde_json::Value) -> AppResult<Self> {
        let mut analysis: SkinAnalysis = serde_json::from_value(payload)
            .map_err(|e| AppError::MalformedResponse(format!("skin analysis: {}", e)))?;

        let mut seen = Vec::new();
        analysis.concerns.retain(|c| {
            if seen.contains(c) {
                false
            } else {
                seen.push(*c);
                true
            }
        });
        analysis.concerns.truncate(MAX_CONCERNS);

        if analysis.concerns.is_empty() {
            return Err(AppError::MalformedResponse(
                "skin analysis contains no concerns".to_string(),
            ));
        }

        Ok(analysis)
    }
}

/// Per-criterion score components reported by the generator.
///
/// Components are passed through as-is; they are not checked against the
/// total match score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchBreakdown {
    #[serde(default)]
    pub skin_type: f64,
    #[serde(default)]
    pub concerns: f64,
    #[serde(default)]
    pub age: f64,
}

/// One reconciled recommendation, always referencing a product that was
/// actually offered to the generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecommendation {
    pub product: Product,
    pub match_score: f64,
    #[serde(default)]
    pub match_breakdown: Option<MatchBreakdown>,
    pub justification: String,
    #[serde(default)]
    pub expected_benefits: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutineAdvice {
    #[serde(default)]
    pub morning: Vec<String>,
    #[serde(default)]
    pub evening: Vec<String>,
    #[serde(default)]
    pub weekly: Vec<String>,
}

/// Final response assembled by the recommendation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub skin_analysis: SkinAnalysis,
    pub recommendations: Vec<ProductRecommendation>,
    #[serde(default)]
    pub general_tips: Vec<String>,
    #[serde(default)]
    pub routine_advice: Option<RoutineAdvice>,
    #[serde(default)]
    pub ingredients_to_look_for: Vec<String>,
    #[serde(default)]
    pub ingredients_to_avoid: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skin_analysis_from_llm_valid() {
        let payload = json!({
            "skin_type": "oily",
            "concerns": ["acne", "large_pores"],
            "age_category": "young_adult",
            "observations": ["slight shine on t-zone"]
        });

        let analysis = SkinAnalysis::from_llm(payload).unwrap();
        assert_eq!(analysis.skin_type, SkinType::Oily);
        assert_eq!(
            analysis.concerns,
            vec![SkinConcern::Acne, SkinConcern::LargePores]
        );
        assert_eq!(analysis.age_category, AgeCategory::YoungAdult);
        assert_eq!(analysis.observations.len(), 1);
    }

    #[test]
    fn test_skin_analysis_deduplicates_and_truncates_concerns() {
        let payload = json!({
            "skin_type": "dry",
            "concerns": ["wrinkles", "wrinkles", "dullness", "dehydration", "redness"],
            "age_category": "mature"
        });

        let analysis = SkinAnalysis::from_llm(payload).unwrap();
        assert_eq!(
            analysis.concerns,
            vec![
                SkinConcern::Wrinkles,
                SkinConcern::Dullness,
                SkinConcern::Dehydration
            ]
        );
    }

    #[test]
    fn test_skin_analysis_rejects_empty_concerns() {
        let payload = json!({
            "skin_type": "normal",
            "concerns": [],
            "age_category": "teen"
        });

        let err = SkinAnalysis::from_llm(payload).unwrap_err();
        assert!(matches!(err, crate::error::AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_skin_analysis_rejects_unknown_skin_type() {
        let payload = json!({
            "skin_type": "reptilian",
            "concerns": ["acne"],
            "age_category": "teen"
        });

        assert!(SkinAnalysis::from_llm(payload).is_err());
    }

    #[test]
    fn test_skin_analysis_missing_observations_defaults_empty() {
        let payload = json!({
            "skin_type": "sensitive",
            "concerns": ["redness"],
            "age_category": "senior"
        });

        let analysis = SkinAnalysis::from_llm(payload).unwrap();
        assert!(analysis.observations.is_empty());
    }
}
