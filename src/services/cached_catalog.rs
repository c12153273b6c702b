use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{CatalogStatistics, Profile, Title},
    services::catalog::{CatalogStore, TitleFilter, TitlePage, TitleQuery},
};

/// Read-through Redis cache in front of another catalog store
///
/// Single-entity lookups, the category list and the catalog statistics are
/// cached; misses are not, so an entity created after a failed lookup is
/// visible immediately. Listings, browse queries and searches always go to the
/// inner store because their order is significant and their filters unbounded.
pub struct CachedCatalogStore<S> {
    inner: S,
    cache: Cache,
    ttl: u64,
}

impl<S: CatalogStore> CachedCatalogStore<S> {
    pub fn new(inner: S, cache: Cache, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait::async_trait]
impl<S: CatalogStore> CatalogStore for CachedCatalogStore<S> {
    async fn get_profile(&self, profile_id: i64) -> AppResult<Option<Profile>> {
        let key = CacheKey::Profile(profile_id);
        if let Some(profile) = self.cache.get_from_cache::<Profile>(&key).await? {
            return Ok(Some(profile));
        }

        let profile = self.inner.get_profile(profile_id).await?;
        if let Some(profile) = &profile {
            self.cache.set_in_background(&key, profile, self.ttl);
        }
        Ok(profile)
    }

    async fn list_profiles(&self, account_id: Option<i64>) -> AppResult<Vec<Profile>> {
        self.inner.list_profiles(account_id).await
    }

    async fn get_title(&self, show_id: &str) -> AppResult<Option<Title>> {
        let key = CacheKey::Title(show_id.to_string());
        if let Some(title) = self.cache.get_from_cache::<Title>(&key).await? {
            return Ok(Some(title));
        }

        let title = self.inner.get_title(show_id).await?;
        if let Some(title) = &title {
            self.cache.set_in_background(&key, title, self.ttl);
        }
        Ok(title)
    }

    async fn list_titles(&self, filter: &TitleFilter) -> AppResult<Vec<Title>> {
        self.inner.list_titles(filter).await
    }

    async fn search_titles(&self, query: &str, limit: usize) -> AppResult<Vec<Title>> {
        self.inner.search_titles(query, limit).await
    }

    async fn query_titles(&self, query: &TitleQuery) -> AppResult<TitlePage> {
        self.inner.query_titles(query).await
    }

    async fn list_categories(&self) -> AppResult<Vec<String>> {
        cached!(self.cache, CacheKey::Categories, self.ttl, self.inner.list_categories())
    }

    async fn statistics(&self) -> AppResult<CatalogStatistics> {
        cached!(self.cache, CacheKey::Statistics, self.ttl, self.inner.statistics())
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_redis_client, InMemoryCatalogStore};
    use crate::models::{ContentRating, TitleType};
    use redis::AsyncCommands;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    fn title(show_id: &str) -> Title {
        Title {
            show_id: show_id.to_string(),
            title_name: "Lantern Festival".to_string(),
            category: "Family".to_string(),
            sub_category: None,
            duration: 102,
            age_rating: ContentRating::Pg,
            title_type: TitleType::Movie,
            year: 2023,
            origin_region: "Asia".to_string(),
            language: "Mandarin".to_string(),
            episode_count: 1,
            is_kids_content: true,
            rating: Some(7.3),
            votes: Some(2100),
            has_external_rating: true,
            completeness_score: 1.0,
        }
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_title_lookup_is_cached_after_first_hit() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::new(client.clone());
        let show_id = "cached_store_test_s1";

        let inner = InMemoryCatalogStore::new(vec![], vec![title(show_id)]);
        let store = CachedCatalogStore::new(inner, cache.clone(), 60);

        let first = store.get_title(show_id).await.unwrap();
        assert!(first.is_some());
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let key = CacheKey::Title(show_id.to_string());
        let cached: Option<Title> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(cached, first);

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_missing_title_is_not_cached() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::new(client);

        let store = CachedCatalogStore::new(InMemoryCatalogStore::default(), cache.clone(), 60);
        assert!(store.get_title("cached_store_missing").await.unwrap().is_none());
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let key = CacheKey::Title("cached_store_missing".to_string());
        let cached: Option<Title> = cache.get_from_cache(&key).await.unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_statistics_are_cached() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::new(client.clone());

        let inner = InMemoryCatalogStore::new(vec![], vec![title("cached_store_stats_s1")]);
        let store = CachedCatalogStore::new(inner, cache.clone(), 60);

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total_titles, 1);
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let cached: Option<CatalogStatistics> =
            cache.get_from_cache(&CacheKey::Statistics).await.unwrap();
        assert_eq!(cached, Some(stats));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(CacheKey::Statistics.to_string()).await.unwrap();
    }
}
