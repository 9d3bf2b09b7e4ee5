/// Serves a catalog response from the optional Redis cache.
///
/// On a hit the cached value is returned. On a miss, or when the cache is
/// unreachable, the block runs and its value is queued for a background
/// write. With no cache configured the block always runs.
///
/// # Arguments
/// * `$cache`: an `Option<Cache>`.
/// * `$key`: the `CacheKey` for the query; its TTL comes from `CacheKey::ttl`.
/// * `$block`: a future producing `AppResult<T>`.
///
/// # Example
/// ```rust,ignore
/// let movies: Vec<ContentItem> = cached!(self.cache, CacheKey::Trending, async move {
///     self.fetch_list("/trending/movie/week", &[]).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        let key = $key;
        match $cache.as_ref() {
            Some(cache) => match cache.get_from_cache(&key).await {
                Ok(Some(hit)) => Ok(hit),
                miss => {
                    if let Err(e) = miss {
                        tracing::warn!(key = %key, error = %e, "Cache read failed, querying catalog");
                    }
                    let value = $block.await?;
                    cache.set_in_background(&key, &value);
                    Ok(value)
                }
            },
            None => $block.await,
        }
    }};
}
