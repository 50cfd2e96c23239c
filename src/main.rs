use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dermalens_api::api::{create_router, AppState};
use dermalens_api::catalog::Catalog;
use dermalens_api::config::Config;
use dermalens_api::db::{AnalyticsSink, RedisAnalytics};
use dermalens_api::services::{ImageStager, LlmService, RecommendationService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let catalog = Arc::new(Catalog::builtin());
    tracing::info!(products = catalog.all().len(), "Catalog loaded");

    let (analytics, analytics_handle) = RedisAnalytics::connect(config.redis_url.as_deref()).await;
    let analytics: Arc<dyn AnalyticsSink> = Arc::new(analytics);

    let llm = LlmService::from_config(&config)?;
    tracing::info!(primary = llm.primary_name(), "LLM service initialized");

    let stager = Arc::new(ImageStager::new(&config.staging_dir, &config.staging_base_url).await?);

    let recommender = Arc::new(RecommendationService::new(
        llm,
        catalog.clone(),
        analytics.clone(),
    ));

    let state = AppState {
        recommender,
        stager,
        catalog,
        analytics,
    };
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush any queued analytics increments before exiting.
    analytics_handle.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
