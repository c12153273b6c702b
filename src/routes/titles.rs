use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{capped_limit, AppState};
use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{ContentRating, RankedTitle, Title, TitleType},
    services::catalog::{SortField, SortOrder, TitleQuery},
};

const DEFAULT_SIMILAR_LIMIT: usize = 10;
const MAX_SIMILAR_LIMIT: usize = 20;
const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 50;
const DEFAULT_FILTER_LIMIT: usize = 50;
const MAX_FILTER_LIMIT: usize = 100;
const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

/// `type` value selecting kids content instead of a title type
const KIDS_TYPE: &str = "kids";

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimilarTitlesResponse {
    pub show_id: String,
    pub data: Vec<RankedTitle>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub data: Vec<Title>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub data: Vec<String>,
    pub count: usize,
}

/// Query string of `GET /titles/filter`
///
/// Text criteria set to `all` or left empty are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub title_type: Option<String>,
    pub age_rating: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub kids_only: Option<String>,
    pub min_rating: Option<f64>,
    pub language: Option<String>,
    pub limit: Option<usize>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

fn selected(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl FilterParams {
    fn into_query(self) -> AppResult<TitleQuery> {
        let mut kids_only = self
            .kids_only
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        let title_type = match selected(self.title_type) {
            Some(t) if t.eq_ignore_ascii_case(KIDS_TYPE) => {
                kids_only = true;
                None
            }
            Some(t) => Some(
                t.parse::<TitleType>()
                    .map_err(|_| AppError::InvalidInput(format!("Unknown title type: {}", t)))?,
            ),
            None => None,
        };

        let age_rating = selected(self.age_rating)
            .map(|r| {
                r.parse::<ContentRating>()
                    .map_err(|_| AppError::InvalidInput(format!("Unknown age rating: {}", r)))
            })
            .transpose()?;

        Ok(TitleQuery {
            category: selected(self.category),
            title_type,
            age_rating,
            year_min: self.year_min,
            year_max: self.year_max,
            kids_only,
            // A zero minimum would only drop unrated titles
            min_rating: self.min_rating.filter(|r| *r > 0.0),
            language: selected(self.language),
            sort_by: SortField::parse_or_default(self.sort_by.as_deref()),
            order: SortOrder::parse_or_default(self.order.as_deref()),
            offset: 0,
            limit: capped_limit(self.limit, DEFAULT_FILTER_LIMIT, MAX_FILTER_LIMIT),
        })
    }
}

/// Criteria echoed back by `GET /titles/filter` after normalization
#[derive(Debug, Serialize)]
pub struct AppliedFilters {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub title_type: Option<TitleType>,
    pub age_rating: Option<ContentRating>,
    pub year_range: Option<(Option<i32>, Option<i32>)>,
    pub kids_only: bool,
    pub min_rating: Option<f64>,
    pub language: Option<String>,
    pub sort_by: &'static str,
    pub order: &'static str,
}

impl From<&TitleQuery> for AppliedFilters {
    fn from(query: &TitleQuery) -> Self {
        let year_range = (query.year_min.is_some() || query.year_max.is_some())
            .then_some((query.year_min, query.year_max));

        Self {
            category: query.category.clone(),
            title_type: query.title_type,
            age_rating: query.age_rating,
            year_range,
            kids_only: query.kids_only,
            min_rating: query.min_rating,
            language: query.language.clone(),
            sort_by: query.sort_by.as_str(),
            order: query.order.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub data: Vec<Title>,
    pub count: usize,
    pub filters_applied: AppliedFilters,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub data: Vec<Title>,
    pub pagination: Pagination,
}

/// Catalog titles matching every given criterion, sorted
pub async fn filter(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<FilterParams>,
) -> AppResult<Json<FilterResponse>> {
    let query = params.into_query()?;

    tracing::info!(request_id = %request_id, ?query, "Processing title filter request");

    let page = state.store.query_titles(&query).await?;

    Ok(Json(FilterResponse {
        count: page.titles.len(),
        data: page.titles,
        filters_applied: AppliedFilters::from(&query),
    }))
}

/// The whole catalog, one page at a time
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<PageResponse>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = capped_limit(params.per_page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).max(1);

    let query = TitleQuery {
        sort_by: SortField::parse_or_default(params.sort_by.as_deref()),
        order: SortOrder::parse_or_default(params.order.as_deref()),
        offset: (page - 1).saturating_mul(per_page),
        limit: per_page,
        ..Default::default()
    };
    let result = state.store.query_titles(&query).await?;

    Ok(Json(PageResponse {
        data: result.titles,
        pagination: Pagination {
            page,
            per_page,
            total: result.total,
            pages: result.total.div_ceil(per_page as u64),
        },
    }))
}

/// Title details by show id
pub async fn get_title(
    State(state): State<Arc<AppState>>,
    Path(show_id): Path<String>,
) -> AppResult<Json<Title>> {
    state
        .store
        .get_title(&show_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Title {} not found", show_id)))
}

/// Titles in the same category ranked by similarity
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(show_id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<SimilarTitlesResponse>> {
    let limit = capped_limit(params.limit, DEFAULT_SIMILAR_LIMIT, MAX_SIMILAR_LIMIT);

    tracing::info!(
        request_id = %request_id,
        show_id = %show_id,
        limit,
        "Processing similar titles request"
    );

    let data = state.engine.similar_titles(&show_id, limit).await?;

    Ok(Json(SimilarTitlesResponse {
        show_id,
        count: data.len(),
        data,
    }))
}

/// Title name search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Query parameter \"q\" is required".to_string(),
        ));
    }

    let limit = capped_limit(params.limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);
    let data = state.store.search_titles(&query, limit).await?;

    Ok(Json(SearchResponse {
        query,
        count: data.len(),
        data,
    }))
}

/// Distinct catalog categories
pub async fn categories(State(state): State<Arc<AppState>>) -> AppResult<Json<CategoriesResponse>> {
    let data = state.store.list_categories().await?;
    Ok(Json(CategoriesResponse {
        count: data.len(),
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_params_ignore_all_and_blank() {
        let params = FilterParams {
            category: Some("all".to_string()),
            language: Some("  ".to_string()),
            age_rating: Some("All".to_string()),
            ..Default::default()
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.category, None);
        assert_eq!(query.language, None);
        assert_eq!(query.age_rating, None);
        assert_eq!(query.limit, DEFAULT_FILTER_LIMIT);
    }

    #[test]
    fn test_kids_type_selects_kids_content() {
        let params = FilterParams {
            title_type: Some("kids".to_string()),
            ..Default::default()
        };
        let query = params.into_query().unwrap();
        assert!(query.kids_only);
        assert_eq!(query.title_type, None);
    }

    #[test]
    fn test_filter_params_parse_typed_criteria() {
        let params = FilterParams {
            title_type: Some("Series".to_string()),
            age_rating: Some("13+".to_string()),
            kids_only: Some("TRUE".to_string()),
            min_rating: Some(0.0),
            limit: Some(500),
            sort_by: Some("year".to_string()),
            order: Some("asc".to_string()),
            ..Default::default()
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.title_type, Some(TitleType::Series));
        assert_eq!(query.age_rating, Some(ContentRating::Teen13));
        assert!(query.kids_only);
        assert_eq!(query.min_rating, None);
        assert_eq!(query.limit, MAX_FILTER_LIMIT);
        assert_eq!(query.sort_by, SortField::Year);
        assert_eq!(query.order, SortOrder::Asc);
    }

    #[test]
    fn test_unknown_type_or_rating_is_invalid_input() {
        let params = FilterParams {
            title_type: Some("Podcast".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.into_query(), Err(AppError::InvalidInput(_))));

        let params = FilterParams {
            age_rating: Some("NC-17".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.into_query(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_applied_filters_year_range() {
        let query = TitleQuery {
            year_min: Some(2000),
            ..Default::default()
        };
        let applied = AppliedFilters::from(&query);
        assert_eq!(applied.year_range, Some((Some(2000), None)));

        let applied = AppliedFilters::from(&TitleQuery::default());
        assert_eq!(applied.year_range, None);
        assert_eq!(applied.sort_by, "rating");
        assert_eq!(applied.order, "desc");
    }
}
