pub mod memory;
pub mod redis;

use std::collections::HashMap;
use std::fmt::Display;

use chrono::NaiveDate;

use crate::error::AppResult;

pub use memory::MemoryAnalytics;
pub use self::redis::{AnalyticsWriterHandle, RedisAnalytics};

/// A single analytics counter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CounterKey {
    /// Per-product recommendation counter
    Product(String),
    /// Per-day recommendation counter
    Day(NaiveDate),
}

impl Display for CounterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CounterKey::Product(id) => write!(f, "product:{}", id),
            CounterKey::Day(day) => write!(f, "day:{}", day.format("%Y-%m-%d")),
        }
    }
}

/// Counter store for recommendation analytics.
///
/// Writes are fire-and-forget: `record` must never block the caller or
/// surface an error into the request path. Implementations must support
/// concurrent increments without lost updates.
#[async_trait::async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// Increments a counter. Best-effort; failures are logged, not returned.
    fn record(&self, key: CounterKey);

    /// Reads all counters as a key/count mapping
    async fn counts(&self) -> AppResult<HashMap<String, u64>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_key_display_product() {
        let key = CounterKey::Product("prod_001".to_string());
        assert_eq!(format!("{}", key), "product:prod_001");
    }

    #[test]
    fn test_counter_key_display_day() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let key = CounterKey::Day(day);
        assert_eq!(format!("{}", key), "day:2025-03-09");
    }
}
