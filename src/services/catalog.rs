//! Catalog store abstraction
//!
//! The ranking engine never opens connections itself. It reads profile and
//! title snapshots through this trait, so any persistence engine (PostgreSQL,
//! an in-memory snapshot, a cache in front of either) can back it.

use std::cmp::Ordering;

use crate::{
    error::AppResult,
    models::{CatalogStatistics, ContentRating, Profile, Title, TitleType},
};

/// Row cap applied by [`TitleQuery::default`]
pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// Criteria for listing catalog titles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleFilter {
    /// Permitted content ratings; `None` leaves ratings unrestricted
    pub ratings: Option<Vec<ContentRating>>,
    /// Only return titles flagged as kids content
    pub kids_only: bool,
    pub category: Option<String>,
    pub exclude_show_id: Option<String>,
}

impl TitleFilter {
    /// Returns true when `title` satisfies every criterion of the filter
    pub fn matches(&self, title: &Title) -> bool {
        if let Some(ratings) = &self.ratings {
            if !ratings.contains(&title.age_rating) {
                return false;
            }
        }
        if self.kids_only && !title.is_kids_content {
            return false;
        }
        if let Some(category) = &self.category {
            if &title.category != category {
                return false;
            }
        }
        if let Some(excluded) = &self.exclude_show_id {
            if &title.show_id == excluded {
                return false;
            }
        }
        true
    }
}

/// Column a [`TitleQuery`] orders by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Rating,
    Year,
    TitleName,
    Duration,
}

impl SortField {
    /// Parses a request value; anything unrecognized sorts by rating
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("year") => SortField::Year,
            Some("title_name") => SortField::TitleName,
            Some("duration") => SortField::Duration,
            _ => SortField::Rating,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Rating => "rating",
            SortField::Year => "year",
            SortField::TitleName => "title_name",
            SortField::Duration => "duration",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Only an explicit "asc" sorts ascending
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some(order) if order.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Browse query over the catalog: criteria, ordering and a row window
///
/// Missing ratings sort below every present rating, so they come first when
/// ascending and last when descending. Ties keep the store's natural order.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleQuery {
    pub category: Option<String>,
    pub title_type: Option<TitleType>,
    pub age_rating: Option<ContentRating>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub kids_only: bool,
    /// Titles without a rating never satisfy a minimum
    pub min_rating: Option<f64>,
    pub language: Option<String>,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub offset: usize,
    pub limit: usize,
}

impl Default for TitleQuery {
    fn default() -> Self {
        Self {
            category: None,
            title_type: None,
            age_rating: None,
            year_min: None,
            year_max: None,
            kids_only: false,
            min_rating: None,
            language: None,
            sort_by: SortField::default(),
            order: SortOrder::default(),
            offset: 0,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl TitleQuery {
    /// Returns true when `title` satisfies every criterion, ignoring the window
    pub fn matches(&self, title: &Title) -> bool {
        fn equals(wanted: &Option<String>, actual: &str) -> bool {
            wanted.as_deref().map_or(true, |wanted| wanted == actual)
        }

        equals(&self.category, &title.category)
            && equals(&self.language, &title.language)
            && self.title_type.map_or(true, |t| t == title.title_type)
            && self.age_rating.map_or(true, |r| r == title.age_rating)
            && self.year_min.map_or(true, |min| title.year >= min)
            && self.year_max.map_or(true, |max| title.year <= max)
            && (!self.kids_only || title.is_kids_content)
            && self
                .min_rating
                .map_or(true, |min| title.rating.is_some_and(|r| r >= min))
    }

    /// Orders two titles by the sort field in the requested direction
    pub fn compare(&self, a: &Title, b: &Title) -> Ordering {
        let ordering = match self.sort_by {
            SortField::Rating => match (a.rating, b.rating) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
            },
            SortField::Year => a.year.cmp(&b.year),
            SortField::TitleName => a.title_name.cmp(&b.title_name),
            SortField::Duration => a.duration.cmp(&b.duration),
        };

        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// One window of a [`TitleQuery`] together with the number of matches overall
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitlePage {
    pub titles: Vec<Title>,
    pub total: u64,
}

/// Read access to profiles and titles
///
/// Every call returns a fully materialized snapshot. Missing entities are
/// `Ok(None)`; only store access failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_profile(&self, profile_id: i64) -> AppResult<Option<Profile>>;

    /// Profiles ordered by id, optionally restricted to one account
    async fn list_profiles(&self, account_id: Option<i64>) -> AppResult<Vec<Profile>>;

    async fn get_title(&self, show_id: &str) -> AppResult<Option<Title>>;

    /// Lists titles matching `filter` in the store's natural order
    ///
    /// The order is significant: the ranking engine relies on it to break
    /// score ties.
    async fn list_titles(&self, filter: &TitleFilter) -> AppResult<Vec<Title>>;

    /// Case-insensitive substring search over title names
    async fn search_titles(&self, query: &str, limit: usize) -> AppResult<Vec<Title>>;

    /// Sorted, windowed browse over the catalog
    async fn query_titles(&self, query: &TitleQuery) -> AppResult<TitlePage>;

    /// Distinct catalog categories, sorted, excluding the "Unknown" placeholder
    async fn list_categories(&self) -> AppResult<Vec<String>>;

    async fn statistics(&self) -> AppResult<CatalogStatistics>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
