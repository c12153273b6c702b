use serde::Deserialize;
use std::{collections::BTreeSet, path::Path};

use crate::{
    error::{AppError, AppResult},
    models::{CatalogStatistics, Profile, Title, TitleType},
    services::catalog::{CatalogStore, TitleFilter, TitlePage, TitleQuery},
};

/// Catalog snapshot as stored on disk
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub titles: Vec<Title>,
}

/// Catalog store over an in-memory snapshot
///
/// Titles are kept in insertion order, which is the natural order reported by
/// `list_titles` and `search_titles`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    profiles: Vec<Profile>,
    titles: Vec<Title>,
}

impl InMemoryCatalogStore {
    pub fn new(profiles: Vec<Profile>, titles: Vec<Title>) -> Self {
        Self { profiles, titles }
    }

    /// Loads a JSON catalog snapshot of the form `{"profiles": [...], "titles": [...]}`
    pub async fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Internal(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;

        let store = Self::from_json(&raw)?;

        tracing::info!(
            path = %path.display(),
            profiles = store.profiles.len(),
            titles = store.titles.len(),
            "Loaded catalog snapshot"
        );

        Ok(store)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(raw)
            .map_err(|e| AppError::Internal(format!("Invalid catalog snapshot: {}", e)))?;
        Ok(Self::new(snapshot.profiles, snapshot.titles))
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get_profile(&self, profile_id: i64) -> AppResult<Option<Profile>> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.profile_id == profile_id)
            .cloned())
    }

    async fn list_profiles(&self, account_id: Option<i64>) -> AppResult<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self
            .profiles
            .iter()
            .filter(|p| account_id.map_or(true, |id| p.account_id == id))
            .cloned()
            .collect();
        profiles.sort_by_key(|p| p.profile_id);
        Ok(profiles)
    }

    async fn get_title(&self, show_id: &str) -> AppResult<Option<Title>> {
        Ok(self.titles.iter().find(|t| t.show_id == show_id).cloned())
    }

    async fn list_titles(&self, filter: &TitleFilter) -> AppResult<Vec<Title>> {
        Ok(self
            .titles
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn search_titles(&self, query: &str, limit: usize) -> AppResult<Vec<Title>> {
        let needle = query.to_lowercase();
        Ok(self
            .titles
            .iter()
            .filter(|t| t.title_name.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn query_titles(&self, query: &TitleQuery) -> AppResult<TitlePage> {
        let mut matches: Vec<&Title> = self.titles.iter().filter(|t| query.matches(t)).collect();
        matches.sort_by(|a, b| query.compare(a, b));

        Ok(TitlePage {
            total: matches.len() as u64,
            titles: matches
                .into_iter()
                .skip(query.offset)
                .take(query.limit)
                .cloned()
                .collect(),
        })
    }

    async fn list_categories(&self) -> AppResult<Vec<String>> {
        let mut categories: Vec<String> = self
            .titles
            .iter()
            .map(|t| t.category.clone())
            .filter(|c| !c.is_empty() && c != "Unknown")
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn statistics(&self) -> AppResult<CatalogStatistics> {
        Ok(statistics(&self.profiles, &self.titles))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Snapshots carry no account table, so accounts are counted from profiles
fn statistics(profiles: &[Profile], titles: &[Title]) -> CatalogStatistics {
    fn count<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> u64 {
        items.iter().filter(|item| predicate(item)).count() as u64
    }

    fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> u64 {
        values.collect::<BTreeSet<_>>().len() as u64
    }

    let ratings: Vec<f64> = titles
        .iter()
        .filter(|t| t.has_external_rating)
        .filter_map(|t| t.rating)
        .collect();
    let avg_rating =
        (!ratings.is_empty()).then(|| ratings.iter().sum::<f64>() / ratings.len() as f64);

    CatalogStatistics {
        total_accounts: profiles
            .iter()
            .map(|p| p.account_id)
            .collect::<BTreeSet<_>>()
            .len() as u64,
        total_profiles: profiles.len() as u64,
        kids_profiles: count(profiles, |p| p.kids_profile),
        total_titles: titles.len() as u64,
        kids_content: count(titles, |t| t.is_kids_content),
        movies: count(titles, |t| t.title_type == TitleType::Movie),
        series: count(titles, |t| t.title_type == TitleType::Series),
        titles_with_ratings: count(titles, |t| t.has_external_rating),
        avg_rating,
        unique_categories: distinct(titles.iter().map(|t| t.category.as_str())),
        unique_languages: distinct(titles.iter().map(|t| t.language.as_str())),
        unique_regions: distinct(titles.iter().map(|t| t.origin_region.as_str())),
    }
}
