use serde::{Deserialize, Serialize};

/// Recommendation count for a single product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStats {
    pub product_id: String,
    pub product_name: String,
    pub recommendation_count: u64,
}

/// Recommendation count for a single day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCount {
    pub day: String,
    pub recommendation_count: u64,
}

/// Aggregated analytics returned by the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub total_recommendations: u64,
    pub product_stats: Vec<ProductStats>,
    pub daily_breakdown: Vec<DailyCount>,
}
