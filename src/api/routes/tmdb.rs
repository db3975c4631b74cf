//! TMDB proxy routes.
//!
//! All routes resolve through the shared gateway with
//! [`FailurePolicy::Fallback`]: upstream outages produce placeholder
//! payloads, while an upstream 429 or 404 is answered with the same status.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::error_response;
use crate::api::server::AppState;
use crate::tmdb::{FailurePolicy, TmdbResource};

async fn serve(state: &AppState, resource: TmdbResource) -> Response {
    match state
        .gateway
        .resolve(&resource, FailurePolicy::Fallback)
        .await
    {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn trending(State(state): State<Arc<AppState>>) -> Response {
    serve(&state, TmdbResource::Trending).await
}

pub async fn popular(State(state): State<Arc<AppState>>) -> Response {
    serve(&state, TmdbResource::Popular).await
}

pub async fn tv_popular(State(state): State<Arc<AppState>>) -> Response {
    serve(&state, TmdbResource::TvPopular).await
}

pub async fn tv_top_rated(State(state): State<Arc<AppState>>) -> Response {
    serve(&state, TmdbResource::TvTopRated).await
}

pub async fn tv_on_the_air(State(state): State<Arc<AppState>>) -> Response {
    serve(&state, TmdbResource::TvOnTheAir).await
}

pub async fn tv_airing_today(State(state): State<Arc<AppState>>) -> Response {
    serve(&state, TmdbResource::TvAiringToday).await
}

pub async fn genre(State(state): State<Arc<AppState>>, Path(id): Path<u32>) -> Response {
    serve(&state, TmdbResource::Genre(id)).await
}

pub async fn movie(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> Response {
    serve(&state, TmdbResource::Movie(id)).await
}

pub async fn tv(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> Response {
    serve(&state, TmdbResource::Tv(id)).await
}

pub async fn tv_season(
    State(state): State<Arc<AppState>>,
    Path((show, season)): Path<(u64, u32)>,
) -> Response {
    serve(&state, TmdbResource::TvSeason { show, season }).await
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.query.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "query is required" })),
        )
            .into_response();
    }
    serve(&state, TmdbResource::Search(query.to_string())).await
}
