//! Plan entitlement evaluation.
//!
//! Stateless mapping from a subscription's `plan_id` string to what it may
//! do. Unknown plans resolve to the free tier and unknown feature names are
//! denied, so a typo can only ever take privilege away.

use serde::Serialize;

use crate::config::EntitlementConfig;

use super::features::Feature;
use super::plans::{DeviceLimit, PlanFeatureSet, PlanId, VideoQuality};

/// Device headroom for a user on a given plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAllowance {
    /// Displayable maximum; unlimited plans report the configured cap.
    pub max: u32,
    pub can_add_more: bool,
    /// True when `max` is a display cap rather than a real limit.
    pub unlimited: bool,
}

/// Human-readable description of a plan's capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilitySummary {
    pub plan: PlanId,
    pub name: &'static str,
    pub lines: Vec<String>,
}

/// Evaluates entitlement predicates against the static plan table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitlementEvaluator {
    unlimited_device_cap: u32,
}

impl Default for EntitlementEvaluator {
    fn default() -> Self {
        Self::new(&EntitlementConfig::default())
    }
}

impl EntitlementEvaluator {
    /// Build an evaluator with the configured display cap for
    /// unlimited device plans.
    pub fn new(config: &EntitlementConfig) -> Self {
        Self {
            unlimited_device_cap: config.unlimited_device_cap.max(1),
        }
    }

    /// Feature record for `plan_id`; unknown ids get the free plan.
    pub fn features_for(&self, plan_id: &str) -> &'static PlanFeatureSet {
        PlanId::parse_or_default(plan_id).features()
    }

    /// Whether `plan_id` grants `feature`. Unknown plans are evaluated as free.
    pub fn has_feature(&self, plan_id: &str, feature: Feature) -> bool {
        feature.granted_by(self.features_for(plan_id))
    }

    /// String entry point for callers holding a raw feature name.
    /// Unrecognised names are denied.
    pub fn has_feature_named(&self, plan_id: &str, feature: &str) -> bool {
        Feature::parse(feature).is_some_and(|f| self.has_feature(plan_id, f))
    }

    /// SD is open to every plan; higher tiers compare by rank.
    pub fn can_access_quality(&self, plan_id: &str, quality: VideoQuality) -> bool {
        quality <= self.features_for(plan_id).max_video_quality
    }

    /// String form of [`can_access_quality`](Self::can_access_quality).
    /// Unrecognised quality names are denied.
    pub fn can_access_quality_named(&self, plan_id: &str, quality: &str) -> bool {
        VideoQuality::parse(quality).is_some_and(|q| self.can_access_quality(plan_id, q))
    }

    /// Device headroom for a subscriber with `current_devices` registered.
    ///
    /// Unlimited plans always allow another device and report the
    /// configured cap as `max` so clients have a number to render.
    pub fn device_limit(&self, plan_id: &str, current_devices: u32) -> DeviceAllowance {
        let limit = self.features_for(plan_id).max_devices;
        let (max, unlimited) = match limit {
            DeviceLimit::Unlimited => (self.unlimited_device_cap, true),
            DeviceLimit::Bounded(n) => (n, false),
        };
        DeviceAllowance {
            max,
            can_add_more: limit.allows_another(current_devices),
            unlimited,
        }
    }

    /// Cheapest plan that grants `feature`, for upgrade prompts.
    pub fn minimum_plan_for(&self, feature: Feature) -> Option<PlanId> {
        PlanId::ALL
            .into_iter()
            .find(|plan| feature.granted_by(plan.features()))
    }

    /// Human-readable capability lines for `plan_id`, in display order.
    pub fn summary(&self, plan_id: &str) -> CapabilitySummary {
        let plan = self.features_for(plan_id);
        let mut lines = Vec::new();

        lines.push(match plan.max_devices {
            DeviceLimit::Unlimited => "Unlimited devices".to_string(),
            DeviceLimit::Bounded(1) => "1 device at a time".to_string(),
            DeviceLimit::Bounded(n) => format!("Up to {n} devices at a time"),
        });
        lines.push(
            match plan.max_video_quality {
                VideoQuality::Sd => "Standard definition (SD) streaming",
                VideoQuality::Hd => "High definition (HD) streaming",
                VideoQuality::Uhd4k => "Ultra HD 4K streaming",
            }
            .to_string(),
        );
        if plan.can_download {
            lines.push("Downloads for offline viewing".to_string());
        }
        if plan.has_exclusive {
            lines.push("Exclusive originals".to_string());
        }
        if plan.early_access_allowed {
            lines.push("Early access to new releases".to_string());
        }
        lines.push(if plan.ads {
            "Ad-supported".to_string()
        } else {
            "Ad-free viewing".to_string()
        });
        if plan.support_level.has_priority() {
            lines.push("Priority support".to_string());
        }

        CapabilitySummary {
            plan: plan.id,
            name: plan.name,
            lines,
        }
    }
}
