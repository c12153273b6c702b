/// Read-through caching over a [`Cache`](crate::db::Cache).
///
/// Returns the value stored under `$key` when present. Otherwise awaits
/// `$block`, queues its result for a background write with a TTL of `$ttl`
/// seconds, and returns it. Errors from either side propagate with `?`, so the
/// macro must be used inside a function returning `AppResult`.
///
/// # Example
/// ```rust,ignore
/// let categories: Vec<String> = cached!(cache, CacheKey::Categories, 3600, async {
///     store.list_categories().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
