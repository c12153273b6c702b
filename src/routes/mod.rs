use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{catalog::CatalogStore, recommendations::RankingEngine, scoring::ScoringModel},
};

pub mod dashboard;
pub mod profiles;
pub mod recommendations;
pub mod titles;

/// Shared application state
pub struct AppState {
    pub engine: RankingEngine,
    pub store: Arc<dyn CatalogStore>,
}

impl AppState {
    /// Builds state where the engine and the lookup handlers share one store
    pub fn new(store: Arc<dyn CatalogStore>, scoring: ScoringModel) -> Self {
        Self {
            engine: RankingEngine::new(store.clone(), scoring),
            store,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profiles", get(profiles::list_profiles))
        .route("/profiles/:profile_id", get(profiles::get_profile))
        .route(
            "/accounts/:account_id/profiles",
            get(profiles::list_account_profiles),
        )
        .route("/recommendations/:profile_id", get(recommendations::recommend))
        .route(
            "/recommendations/:profile_id/category/:category",
            get(recommendations::recommend_in_category),
        )
        .route("/titles", get(titles::list))
        .route("/titles/filter", get(titles::filter))
        .route("/titles/search", get(titles::search))
        .route("/titles/:show_id", get(titles::get_title))
        .route("/titles/:show_id/similar", get(titles::similar))
        .route("/categories", get(titles::categories))
        .route("/statistics", get(dashboard::statistics))
        .route("/dashboard/:profile_id", get(dashboard::dashboard))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Applies the default when `requested` is absent and caps it at `max`
pub(crate) fn capped_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.unwrap_or(default).min(max)
}
