use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{CatalogStatistics, Profile, RankedTitle},
};

/// Recommendations included in a dashboard
const DASHBOARD_RECOMMENDATIONS: usize = 10;

/// Everything a profile landing page needs in one response
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub profile: Profile,
    pub recommendations: Vec<RankedTitle>,
    pub categories: Vec<String>,
    pub statistics: CatalogStatistics,
}

/// Aggregate catalog counts
pub async fn statistics(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<CatalogStatistics>> {
    Ok(Json(state.store.statistics().await?))
}

/// Profile, top recommendations, categories and statistics for one profile
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(profile_id): Path<i64>,
) -> AppResult<Json<DashboardResponse>> {
    let profile = state
        .store
        .get_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", profile_id)))?;

    tracing::info!(request_id = %request_id, profile_id, "Assembling dashboard");

    let (recommendations, categories, statistics) = tokio::try_join!(
        state
            .engine
            .recommend(profile_id, DASHBOARD_RECOMMENDATIONS, &[]),
        state.store.list_categories(),
        state.store.statistics(),
    )?;

    Ok(Json(DashboardResponse {
        profile,
        recommendations,
        categories,
        statistics,
    }))
}
