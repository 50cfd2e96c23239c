use std::collections::HashMap;
use std::sync::Mutex;

use crate::db::{AnalyticsSink, CounterKey};
use crate::error::AppResult;

/// In-process analytics counters.
///
/// Shares the key scheme of the Redis store; used by tests and available for
/// running without external services. Increments are applied under a mutex,
/// so concurrent requests never lose updates.
#[derive(Default)]
pub struct MemoryAnalytics {
    counters: Mutex<HashMap<String, u64>>,
}

impl MemoryAnalytics {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for MemoryAnalytics {
    fn record(&self, key: CounterKey) {
        let mut counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *counters.entry(key.to_string()).or_insert(0) += 1;
    }

    async fn counts(&self) -> AppResult<HashMap<String, u64>> {
        let counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(counters.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_record_and_read_back() {
        let sink = MemoryAnalytics::new();
        sink.record(CounterKey::Product("prod_001".to_string()));
        sink.record(CounterKey::Product("prod_001".to_string()));
        sink.record(CounterKey::Product("prod_002".to_string()));

        let counts = sink.counts().await.unwrap();
        assert_eq!(counts.get("product:prod_001"), Some(&2));
        assert_eq!(counts.get("product:prod_002"), Some(&1));
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let sink = Arc::new(MemoryAnalytics::new());

        let mut handles = Vec::new();
        for _ in 0..100 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                sink.record(CounterKey::Product("prod_001".to_string()));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let counts = sink.counts().await.unwrap();
        assert_eq!(counts.get("product:prod_001"), Some(&100));
    }
}
