use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{capped_limit, AppState};
use crate::{error::AppResult, middleware::RequestId, models::RankedTitle};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
    /// Comma separated show ids the viewer has already watched
    pub exclude: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub profile_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub data: Vec<RankedTitle>,
    pub count: usize,
}

impl RecommendationsResponse {
    fn new(profile_id: i64, category: Option<String>, data: Vec<RankedTitle>) -> Self {
        Self {
            profile_id,
            category,
            count: data.len(),
            data,
        }
    }
}

fn parse_exclude(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Personalized recommendations for a profile
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(profile_id): Path<i64>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    let limit = capped_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let exclude = parse_exclude(params.exclude.as_deref());

    tracing::info!(
        request_id = %request_id,
        profile_id,
        limit,
        excluded = exclude.len(),
        "Processing recommendation request"
    );

    let data = state.engine.recommend(profile_id, limit, &exclude).await?;

    Ok(Json(RecommendationsResponse::new(profile_id, None, data)))
}

/// Personalized recommendations restricted to a single category
pub async fn recommend_in_category(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path((profile_id, category)): Path<(i64, String)>,
    Query(params): Query<CategoryQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    let limit = capped_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);

    tracing::info!(
        request_id = %request_id,
        profile_id,
        category = %category,
        limit,
        "Processing category recommendation request"
    );

    let data = state
        .engine
        .recommend_in_category(profile_id, &category, limit)
        .await?;

    Ok(Json(RecommendationsResponse::new(
        profile_id,
        Some(category),
        data,
    )))
}
