use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::Profile,
};

#[derive(Debug, Deserialize)]
pub struct ProfileListQuery {
    pub account_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProfilesResponse {
    pub data: Vec<Profile>,
    pub count: usize,
}

impl From<Vec<Profile>> for ProfilesResponse {
    fn from(data: Vec<Profile>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Profile details by id
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<i64>,
) -> AppResult<Json<Profile>> {
    let profile = state
        .store
        .get_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", profile_id)))?;

    Ok(Json(profile))
}

/// Every profile ordered by id, optionally narrowed with `?account_id=`
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProfileListQuery>,
) -> AppResult<Json<ProfilesResponse>> {
    let profiles = state.store.list_profiles(params.account_id).await?;
    Ok(Json(profiles.into()))
}

/// Profiles belonging to one account; an unknown account has none
pub async fn list_account_profiles(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<i64>,
) -> AppResult<Json<ProfilesResponse>> {
    let profiles = state.store.list_profiles(Some(account_id)).await?;
    Ok(Json(profiles.into()))
}
