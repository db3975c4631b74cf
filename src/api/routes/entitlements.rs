//! Entitlement check routes.
//!
//! The plan id in the path comes from the caller's subscription record.
//! Unknown plans, features and qualities all answer `allowed: false`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::server::AppState;
use crate::entitlement::Feature;

/// GET /api/entitlements/{plan}/features/{feature}
pub async fn check_feature(
    State(state): State<Arc<AppState>>,
    Path((plan, feature)): Path<(String, String)>,
) -> Json<Value> {
    let allowed = state.evaluator.has_feature_named(&plan, &feature);
    let minimum_plan = Feature::parse(&feature).and_then(|f| state.evaluator.minimum_plan_for(f));
    Json(json!({
        "plan": state.evaluator.features_for(&plan).id,
        "feature": feature,
        "allowed": allowed,
        "minimumPlan": minimum_plan,
    }))
}

/// GET /api/entitlements/{plan}/quality/{quality}
pub async fn check_quality(
    State(state): State<Arc<AppState>>,
    Path((plan, quality)): Path<(String, String)>,
) -> Json<Value> {
    let features = state.evaluator.features_for(&plan);
    Json(json!({
        "plan": features.id,
        "quality": quality,
        "allowed": state.evaluator.can_access_quality_named(&plan, &quality),
        "maxQuality": features.max_video_quality,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeviceParams {
    #[serde(default)]
    pub current: u32,
}

/// GET /api/entitlements/{plan}/devices?current=N
pub async fn check_devices(
    State(state): State<Arc<AppState>>,
    Path(plan): Path<String>,
    Query(params): Query<DeviceParams>,
) -> Json<Value> {
    let allowance = state.evaluator.device_limit(&plan, params.current);
    Json(json!({
        "plan": state.evaluator.features_for(&plan).id,
        "current": params.current,
        "max": allowance.max,
        "canAddMore": allowance.can_add_more,
        "unlimited": allowance.unlimited,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::tests::state_with_client;
    use crate::tmdb::client::MockTmdbClient;

    fn state() -> State<Arc<AppState>> {
        State(Arc::new(state_with_client(MockTmdbClient::new())))
    }

    #[tokio::test]
    async fn test_check_feature_allowed() {
        let Json(body) = check_feature(state(), Path(("vip".into(), "earlyAccess".into()))).await;
        assert_eq!(body["allowed"], true);
        assert_eq!(body["minimumPlan"], "vip");
    }

    #[tokio::test]
    async fn test_check_feature_denied_with_upsell() {
        let Json(body) = check_feature(state(), Path(("basic".into(), "download".into()))).await;
        assert_eq!(body["allowed"], false);
        assert_eq!(body["minimumPlan"], "standard");
    }

    #[tokio::test]
    async fn test_check_unknown_feature() {
        let Json(body) = check_feature(state(), Path(("vip".into(), "teleport".into()))).await;
        assert_eq!(body["allowed"], false);
        assert!(body["minimumPlan"].is_null());
    }

    #[tokio::test]
    async fn test_check_quality() {
        let Json(body) = check_quality(state(), Path(("standard".into(), "4K".into()))).await;
        assert_eq!(body["allowed"], false);
        assert_eq!(body["maxQuality"], "HD");
    }

    #[tokio::test]
    async fn test_check_devices() {
        let Json(body) = check_devices(
            state(),
            Path("vip".into()),
            Query(DeviceParams { current: 7 }),
        )
        .await;
        assert_eq!(body["max"], 10);
        assert_eq!(body["canAddMore"], true);

        let Json(body) = check_devices(
            state(),
            Path("free".into()),
            Query(DeviceParams { current: 1 }),
        )
        .await;
        assert_eq!(body["max"], 1);
        assert_eq!(body["canAddMore"], false);
    }
}
