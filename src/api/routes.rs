use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::{handlers, AppState};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let staging_dir = state.stager.dir().to_path_buf();

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .nest_service("/staged", ServeDir::new(staging_dir))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations/analyze", post(handlers::analyze))
        .route("/recommendations/analyze-url", post(handlers::analyze_url))
        .route("/analytics/stats", get(handlers::stats))
}
