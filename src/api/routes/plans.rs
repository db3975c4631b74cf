//! Subscription plan catalogue routes.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::server::AppState;
use crate::entitlement::{PlanId, PLANS};

/// GET /api/plans: every plan with its features and summary.
pub async fn list_plans(State(state): State<Arc<AppState>>) -> Json<Value> {
    let plans: Vec<Value> = PLANS
        .iter()
        .map(|plan| {
            json!({
                "features": plan,
                "summary": state.evaluator.summary(plan.id.as_str()).lines,
            })
        })
        .collect();
    Json(json!({ "plans": plans }))
}

/// GET /api/plans/{plan}
///
/// Unknown plan ids answer with the free plan and `"recognized": false`.
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<String>,
) -> Json<Value> {
    let features = state.evaluator.features_for(&plan_id);
    let summary = state.evaluator.summary(&plan_id);
    Json(json!({
        "requested": plan_id,
        "recognized": PlanId::parse(&plan_id).is_some(),
        "plan": features.id,
        "features": features,
        "summary": summary.lines,
    }))
}
