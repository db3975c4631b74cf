//! Health endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::server::AppState;

/// GET /api/health: liveness plus a glance at cache and limiter state.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let limiter = state.gateway.limiter();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.started_at.elapsed().as_secs(),
        "cacheEntries": state.gateway.cache().len(),
        "rateLimit": {
            "inWindow": limiter.in_flight_window(),
            "maxRequests": limiter.max_requests(),
            "windowMs": limiter.time_window().as_millis() as u64,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::tests::state_with_client;
    use crate::tmdb::client::MockTmdbClient;

    #[tokio::test]
    async fn test_get_health_returns_ok() {
        let state = State(Arc::new(state_with_client(MockTmdbClient::new())));
        let Json(body) = get_health(state).await;
        assert_eq!(body["status"], "ok");
        assert!(body["version"].is_string());
        assert_eq!(body["cacheEntries"], 0);
        assert_eq!(body["rateLimit"]["maxRequests"], 35);
        assert_eq!(body["rateLimit"]["windowMs"], 10_000);
    }
}
