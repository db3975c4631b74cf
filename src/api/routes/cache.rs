//! Response cache routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::api::server::AppState;
use crate::cache::CacheStats;

/// GET /api/cache/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.gateway.cache_stats())
}

/// DELETE /api/cache: forces the next request for every resource upstream.
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.gateway.clear_cache();
    tracing::info!("Response cache cleared via API");
    StatusCode::NO_CONTENT
}
