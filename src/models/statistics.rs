use serde::{Deserialize, Serialize};

/// Aggregate counts over the whole catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStatistics {
    pub total_accounts: u64,
    pub total_profiles: u64,
    pub kids_profiles: u64,
    pub total_titles: u64,
    pub kids_content: u64,
    pub movies: u64,
    pub series: u64,
    /// Titles carrying an external rating
    pub titles_with_ratings: u64,
    /// Mean external rating over `titles_with_ratings`; `None` when there are none
    pub avg_rating: Option<f64>,
    pub unique_categories: u64,
    pub unique_languages: u64,
    pub unique_regions: u64,
}
