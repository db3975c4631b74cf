//! Axum API server for the StreamFlix backend.

use std::sync::Arc;
use std::time::Instant;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::entitlement::EntitlementEvaluator;
use crate::error::{Result, StreamflixError};
use crate::tmdb::TmdbGateway;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cached, rate-limited TMDB access. One instance per process.
    pub gateway: Arc<TmdbGateway>,
    pub evaluator: EntitlementEvaluator,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(gateway: Arc<TmdbGateway>, evaluator: EntitlementEvaluator) -> Self {
        Self {
            gateway,
            evaluator,
            started_at: Instant::now(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let gateway = TmdbGateway::from_config(config)?;
        Ok(Self::new(
            Arc::new(gateway),
            EntitlementEvaluator::new(&config.entitlements),
        ))
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState, server: &ServerConfig) -> Result<Router> {
    let shared_state = Arc::new(state);

    let allow_origin = match &server.allowed_origin {
        Some(origin) => AllowOrigin::exact(HeaderValue::from_str(origin).map_err(|e| {
            StreamflixError::Config(format!("server.allowed_origin '{origin}' is invalid: {e}"))
        })?),
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::DELETE])
        .allow_headers(Any);

    let router = Router::new()
        // Health
        .route("/api/health", get(super::routes::health::get_health))
        // TMDB proxy
        .route("/api/tmdb/trending", get(super::routes::tmdb::trending))
        .route("/api/tmdb/popular", get(super::routes::tmdb::popular))
        .route("/api/tmdb/tv/popular", get(super::routes::tmdb::tv_popular))
        .route("/api/tmdb/tv/top-rated", get(super::routes::tmdb::tv_top_rated))
        .route("/api/tmdb/tv/on-the-air", get(super::routes::tmdb::tv_on_the_air))
        .route(
            "/api/tmdb/tv/airing-today",
            get(super::routes::tmdb::tv_airing_today),
        )
        .route("/api/tmdb/genre/{id}", get(super::routes::tmdb::genre))
        .route("/api/tmdb/movie/{id}", get(super::routes::tmdb::movie))
        .route("/api/tmdb/tv/{id}", get(super::routes::tmdb::tv))
        .route(
            "/api/tmdb/tv/{id}/season/{season}",
            get(super::routes::tmdb::tv_season),
        )
        .route("/api/tmdb/search", get(super::routes::tmdb::search))
        // Cache
        .route("/api/cache", axum::routing::delete(super::routes::cache::clear_cache))
        .route("/api/cache/stats", get(super::routes::cache::get_stats))
        // Plans & entitlements
        .route("/api/plans", get(super::routes::plans::list_plans))
        .route("/api/plans/{plan}", get(super::routes::plans::get_plan))
        .route(
            "/api/entitlements/{plan}/features/{feature}",
            get(super::routes::entitlements::check_feature),
        )
        .route(
            "/api/entitlements/{plan}/quality/{quality}",
            get(super::routes::entitlements::check_quality),
        )
        .route(
            "/api/entitlements/{plan}/devices",
            get(super::routes::entitlements::check_devices),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    Ok(router)
}

/// Start the API server and run until Ctrl-C.
pub async fn start_server(config: &Config, state: AppState) -> Result<()> {
    let app = build_router(state, &config.server)?;
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("StreamFlix API listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::config::RateLimitConfig;
    use crate::ratelimit::SlidingWindowLimiter;
    use crate::tmdb::client::MockTmdbClient;
    use std::time::Duration;

    /// App state around a mocked upstream.
    pub(crate) fn state_with_client(client: MockTmdbClient) -> AppState {
        let gateway = TmdbGateway::new(
            Arc::new(ResponseCache::new(Duration::from_secs(900))),
            Arc::new(SlidingWindowLimiter::new(&RateLimitConfig::default())),
            Arc::new(client),
        );
        AppState::new(Arc::new(gateway), EntitlementEvaluator::default())
    }

    #[test]
    fn test_build_router_default_cors() {
        let state = state_with_client(MockTmdbClient::new());
        assert!(build_router(state, &ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_build_router_exact_origin() {
        let state = state_with_client(MockTmdbClient::new());
        let server = ServerConfig {
            allowed_origin: Some("http://localhost:3000".into()),
            ..Default::default()
        };
        assert!(build_router(state, &server).is_ok());
    }

    #[test]
    fn test_build_router_rejects_bad_origin() {
        let state = state_with_client(MockTmdbClient::new());
        let server = ServerConfig {
            allowed_origin: Some("bad\norigin".into()),
            ..Default::default()
        };
        assert!(matches!(
            build_router(state, &server),
            Err(StreamflixError::Config(_))
        ));
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = Config::default();
        assert!(AppState::from_config(&config).is_err());
    }
}
