use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider '{provider}' failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("All LLM providers failed: {0}")]
    ProvidersExhausted(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("No suitable products found for this skin profile")]
    NoSuitableProducts,

    #[error("The model returned no valid recommendations")]
    InvalidRecommendations,

    #[error("Image staging error: {0}")]
    Staging(String),

    #[error("Analytics error: {0}")]
    Analytics(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NoSuitableProducts | AppError::InvalidRecommendations => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::Provider { .. }
            | AppError::ProvidersExhausted(_)
            | AppError::MalformedResponse(_)
            | AppError::Staging(_)
            | AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Configuration(_) | AppError::Analytics(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
