use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::db::AnalyticsSink;
use crate::error::AppResult;
use crate::models::{AnalyticsResponse, DailyCount, ProductStats};

const PRODUCT_PREFIX: &str = "product:";
const DAY_PREFIX: &str = "day:";

/// Assembles the analytics report from raw counters.
///
/// Counter read failures degrade to an empty report; analytics must never
/// error out of the service. Product stats are sorted by count descending,
/// the daily breakdown by date; counters for ids no longer in the catalog
/// still contribute to the total but carry no product entry.
pub async fn recommendation_stats(
    catalog: &Catalog,
    sink: &dyn AnalyticsSink,
) -> AppResult<AnalyticsResponse> {
    let counts = match sink.counts().await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::error!(error = %e, "Analytics read failed, returning empty stats");
            HashMap::new()
        }
    };

    let mut total = 0;
    let mut product_stats = Vec::new();
    let mut daily_breakdown = Vec::new();

    for (key, count) in counts {
        if let Some(product_id) = key.strip_prefix(PRODUCT_PREFIX) {
            total += count;
            match catalog.get(product_id) {
                Some(product) => product_stats.push(ProductStats {
                    product_id: product_id.to_string(),
                    product_name: product.name.clone(),
                    recommendation_count: count,
                }),
                None => {
                    tracing::debug!(product_id = %product_id, "Counter for unknown product")
                }
            }
        } else if let Some(day) = key.strip_prefix(DAY_PREFIX) {
            daily_breakdown.push(DailyCount {
                day: day.to_string(),
                recommendation_count: count,
            });
        }
    }

    product_stats.sort_by(|a, b| b.recommendation_count.cmp(&a.recommendation_count));
    daily_breakdown.sort_by(|a, b| a.day.cmp(&b.day));

    Ok(AnalyticsResponse {
        total_recommendations: total,
        product_stats,
        daily_breakdown,
    })
}
