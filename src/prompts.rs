//! Prompt templates for the vision and text generation calls.
//!
//! The JSON shapes requested here are the contract the reconciliation layer
//! parses against; keep key names in sync with the models.

use crate::models::SkinAnalysis;

/// Prompt for the facial image analysis call
pub fn skin_analysis_prompt() -> String {
    r#"You are an expert dermatologist with 20 years of experience in skin analysis.
Analyze the provided facial image with professional precision.

Respond with this exact JSON shape:
{
    "skin_type": "dry|oily|combination|sensitive|normal",
    "concerns": ["up to 3 of: acne, wrinkles, dark_spots, redness, dullness, large_pores, dehydration"],
    "age_category": "teen|young_adult|mature|senior",
    "observations": ["any additional visible characteristics"]
}

Guidelines:
- Be conservative in assessments
- Only note clearly visible characteristics
- Use exact concern names from the predefined list"#
        .to_string()
}

/// Prompt for the product recommendation call.
///
/// `products_json` is the already-filtered catalog subset serialized as JSON;
/// the model must only reference product ids present in it.
pub fn recommendation_prompt(analysis: &SkinAnalysis, products_json: &str) -> String {
    let analysis_json =
        serde_json::to_string_pretty(analysis).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"As a dermatologist, recommend products from our catalog that best match this skin profile:
{analysis_json}

Available products (already filtered for compatibility):
{products_json}

Generate recommendations with:
1. A match score (50-100) weighting skin type alignment (30%), concern targeting (50%) and age appropriateness (20%)
2. A clear justification for each recommendation
3. Specific benefits for the user's concerns

Respond with this exact JSON shape:
{{
    "recommendations": [
        {{
            "product_id": "id from the list above",
            "match_score": 75,
            "match_breakdown": {{ "skin_type": 20, "concerns": 40, "age": 15 }},
            "justification": "Concise explanation of suitability",
            "expected_benefits": ["Benefit 1", "Benefit 2"]
        }}
    ],
    "general_tips": ["General skincare advice"],
    "routine_advice": {{
        "morning": ["Step 1"],
        "evening": ["Step 1"],
        "weekly": ["Special treatment"]
    }},
    "ingredients_to_look_for": ["Beneficial ingredients"],
    "ingredients_to_avoid": ["Potentially problematic ingredients"]
}}

Additional rules:
- Never recommend more than 3 products
- Only use product ids from the list above
- Prioritize products that target multiple concerns"#
    )
}
