use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{AnalyticsResponse, RecommendationResponse};
use crate::services::analytics;
use crate::services::providers::ImageSource;

use super::AppState;

/// Maximum accepted upload size (5 MiB)
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeUrlRequest {
    pub image_url: String,
}

/// Handler for facial-image uploads
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<RecommendationResponse>> {
    let bytes = read_image_field(&mut multipart).await?;
    tracing::info!(size = bytes.len(), "Received image upload");

    // URL-only providers cannot consume inline bytes; stage the upload first.
    let url = if state.recommender.primary_requires_url() {
        Some(state.stager.stage(&bytes).await?)
    } else {
        None
    };

    let image = ImageSource {
        bytes: Some(bytes),
        url,
    };
    let response = state.recommender.recommend(&image).await?;
    Ok(Json(response))
}

/// Handler for analysis of an already-hosted image
pub async fn analyze_url(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeUrlRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    if !request.image_url.starts_with("http://") && !request.image_url.starts_with("https://") {
        return Err(AppError::InvalidInput(
            "image_url must start with http:// or https://".to_string(),
        ));
    }

    tracing::info!(image_url = %request.image_url, "Received image url");

    let image = ImageSource::from_url(request.image_url);
    let response = state.recommender.recommend(&image).await?;
    Ok(Json(response))
}

/// Handler for recommendation analytics
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<AnalyticsResponse>> {
    let stats = analytics::recommendation_stats(&state.catalog, state.analytics.as_ref()).await?;
    Ok(Json(stats))
}

/// Extracts and validates the `image` multipart field
async fn read_image_field(multipart: &mut Multipart) -> AppResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "unsupported image type '{}'; allowed: {}",
                content_type,
                ALLOWED_CONTENT_TYPES.join(", ")
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("failed to read image field: {}", e)))?;

        if bytes.is_empty() {
            return Err(AppError::InvalidInput(
                "uploaded image is empty".to_string(),
            ));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::InvalidInput(format!(
                "image too large; maximum size is {} bytes",
                MAX_IMAGE_BYTES
            )));
        }

        return Ok(bytes.to_vec());
    }

    Err(AppError::InvalidInput(
        "multipart field 'image' is required".to_string(),
    ))
}
