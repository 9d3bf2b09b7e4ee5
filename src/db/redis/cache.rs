use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::GenreId;

/// Catalog queries whose responses are cached
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Trending,
    TopRated,
    Popular,
    Genre(GenreId),
    Search(String),
    Details(u64),
    Trailers(u64),
    GenreList,
}

impl CacheKey {
    /// Seconds a cached response stays valid
    pub fn ttl(&self) -> u64 {
        match self {
            CacheKey::Trending | CacheKey::Popular => 1800,
            CacheKey::TopRated | CacheKey::Genre(_) | CacheKey::Search(_) => 3600,
            CacheKey::Details(_) | CacheKey::Trailers(_) => 86400,
            CacheKey::GenreList => 604800,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Trending => write!(f, "tmdb:trending"),
            CacheKey::TopRated => write!(f, "tmdb:top_rated"),
            CacheKey::Popular => write!(f, "tmdb:popular"),
            CacheKey::Genre(id) => write!(f, "tmdb:genre:{}", id),
            CacheKey::Search(query) => write!(f, "tmdb:search:{}", query.trim().to_lowercase()),
            CacheKey::Details(id) => write!(f, "tmdb:movie:{}", id),
            CacheKey::Trailers(id) => write!(f, "tmdb:trailers:{}", id),
            CacheKey::GenreList => write!(f, "tmdb:genres"),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed cache for catalog responses
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    writer: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task and waits until queued writes are flushed
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.writer.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
    }
}

impl Cache {
    /// Creates the cache and spawns its background writer task
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let writer = tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        (
            Self {
                redis_client,
                write_tx,
            },
            CacheWriterHandle {
                shutdown_tx,
                writer,
            },
        )
    }

    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::warn!(error = %e, "Failed to write catalog response to cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    // Drain what was queued before the signal
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::warn!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }
                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Returns the cached response for `key`, if any
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a write without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl: key.ttl(),
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_lists() {
        assert_eq!(CacheKey::Trending.to_string(), "tmdb:trending");
        assert_eq!(CacheKey::TopRated.to_string(), "tmdb:top_rated");
        assert_eq!(CacheKey::Genre(16).to_string(), "tmdb:genre:16");
    }

    #[test]
    fn test_cache_key_search_is_normalized() {
        let key = CacheKey::Search("  Toy STORY ".to_string());
        assert_eq!(key.to_string(), "tmdb:search:toy story");
    }

    #[test]
    fn test_cache_key_details_and_trailers() {
        assert_eq!(CacheKey::Details(862).to_string(), "tmdb:movie:862");
        assert_eq!(CacheKey::Trailers(862).to_string(), "tmdb:trailers:862");
    }

    #[test]
    fn test_volatile_lists_expire_sooner_than_details() {
        assert!(CacheKey::Trending.ttl() < CacheKey::Details(1).ttl());
        assert!(CacheKey::Details(1).ttl() < CacheKey::GenreList.ttl());
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_writer_to_stop() {
        // Nothing listens on port 1, so queued writes fail fast
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, handle) = Cache::new(client);
        cache.set_in_background(&CacheKey::Trending, &vec!["queued".to_string()]);

        tokio::time::timeout(tokio::time::Duration::from_secs(10), handle.shutdown())
            .await
            .unwrap();

        // The writer owned the receiver; it is gone once shutdown returns
        assert!(cache.write_tx.is_closed());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_set_in_background_writes_to_cache() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let client = create_redis_client(&redis_url).unwrap();
        let (cache, handle) = Cache::new(client.clone());

        let key = CacheKey::Search("reelgate cache probe".to_string());
        let value = vec!["a".to_string(), "b".to_string()];
        cache.set_in_background(&key, &value);

        handle.shutdown().await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}
