use std::sync::Arc;

use crate::catalog::Catalog;
use crate::db::AnalyticsSink;
use crate::services::{ImageStager, RecommendationService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<RecommendationService>,
    pub stager: Arc<ImageStager>,
    pub catalog: Arc<Catalog>,
    pub analytics: Arc<dyn AnalyticsSink>,
}
