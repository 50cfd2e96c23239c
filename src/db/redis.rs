use std::collections::HashMap;

use redis::{AsyncCommands, Client};
use tokio::sync::mpsc;

use crate::db::{AnalyticsSink, CounterKey};
use crate::error::AppResult;

/// Redis hash holding every analytics counter as a field
const COUNTERS_HASH: &str = "analytics:counters";

/// Redis-backed analytics counters.
///
/// Increments are sent to a background writer task over a channel, so
/// recording never blocks a request and write failures never reach the
/// caller. `HINCRBY` keeps concurrent increments from multiple in-flight
/// requests lossless.
///
/// When no Redis URL is configured, or the server is unreachable at startup,
/// the store degrades permanently: writes become no-ops and reads return an
/// empty mapping. The main recommendation flow is unaffected either way.
pub struct RedisAnalytics {
    client: Option<Client>,
    write_tx: Option<mpsc::UnboundedSender<CounterKey>>,
}

/// Handle for gracefully shutting down the analytics writer
pub struct AnalyticsWriterHandle {
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl AnalyticsWriterHandle {
    /// Signals the writer task to flush pending increments and stop
    pub async fn shutdown(self) {
        if let Some(tx) = self.shutdown_tx {
            let _ = tx.send(()).await;
            tracing::info!("Analytics writer shutdown signal sent");
        }
    }
}

impl RedisAnalytics {
    /// Connects to Redis and spawns the background writer task.
    ///
    /// Never fails: an unset URL or an unreachable server yields a degraded
    /// store instead of an error.
    pub async fn connect(redis_url: Option<&str>) -> (Self, AnalyticsWriterHandle) {
        let Some(url) = redis_url else {
            tracing::info!("No Redis URL configured, analytics disabled");
            return Self::degraded();
        };

        let client = match Client::open(url) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid Redis URL, analytics disabled");
                return Self::degraded();
            }
        };

        // Probe the connection once so unreachable servers degrade at startup
        // instead of failing every write.
        if let Err(e) = client.get_multiplexed_async_connection().await {
            tracing::warn!(error = %e, "Redis unreachable, analytics disabled");
            return Self::degraded();
        }

        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let writer_client = client.clone();
        tokio::spawn(async move {
            Self::writer_task(writer_client, write_rx, shutdown_rx).await;
        });

        tracing::info!("Redis analytics connection established");

        (
            Self {
                client: Some(client),
                write_tx: Some(write_tx),
            },
            AnalyticsWriterHandle {
                shutdown_tx: Some(shutdown_tx),
            },
        )
    }

    fn degraded() -> (Self, AnalyticsWriterHandle) {
        (
            Self {
                client: None,
                write_tx: None,
            },
            AnalyticsWriterHandle { shutdown_tx: None },
        )
    }

    /// Background task applying counter increments.
    ///
    /// On shutdown signal, drains the channel before exiting so accepted
    /// increments are not lost.
    async fn writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CounterKey>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Analytics writer task started");

        loop {
            tokio::select! {
                Some(key) = write_rx.recv() => {
                    if let Err(e) = Self::apply_increment(&client, &key).await {
                        tracing::error!(error = %e, counter = %key, "Failed to write analytics counter");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    while let Some(key) = write_rx.recv().await {
                        if let Err(e) = Self::apply_increment(&client, &key).await {
                            tracing::error!(error = %e, counter = %key, "Failed to flush analytics counter during shutdown");
                        }
                    }
                    tracing::info!("Analytics writer task stopped");
                    break;
                }
            }
        }
    }

    async fn apply_increment(client: &Client, key: &CounterKey) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: i64 = conn.hincr(COUNTERS_HASH, key.to_string(), 1i64).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for RedisAnalytics {
    fn record(&self, key: CounterKey) {
        let Some(tx) = &self.write_tx else {
            return;
        };
        if let Err(e) = tx.send(key) {
            tracing::error!(error = %e, "Failed to queue analytics increment");
        }
    }

    async fn counts(&self) -> AppResult<HashMap<String, u64>> {
        let Some(client) = &self.client else {
            return Ok(HashMap::new());
        };

        let mut conn = client.get_multiplexed_async_connection().await?;
        let counts: HashMap<String, u64> = conn.hgetall(COUNTERS_HASH).await?;
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_store_is_degraded() {
        let (store, _handle) = RedisAnalytics::connect(None).await;

        // Writes are no-ops, reads are empty, nothing errors.
        store.record(CounterKey::Product("prod_001".to_string()));
        let counts = store.counts().await.unwrap();
        assert!(counts.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_degrades_at_startup() {
        // Port 1 refuses connections immediately.
        let (store, _handle) = RedisAnalytics::connect(Some("redis://127.0.0.1:1")).await;

        store.record(CounterKey::Product("prod_001".to_string()));
        let counts = store.counts().await.unwrap();
        assert!(counts.is_empty());
    }
}
