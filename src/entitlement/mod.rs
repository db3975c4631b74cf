//! Subscription plan entitlements.
//!
//! Plans are fixed configuration ([`plans::PLANS`]); evaluation is pure and
//! never fails.

pub mod evaluator;
pub mod features;
pub mod plans;

pub use evaluator::{CapabilitySummary, DeviceAllowance, EntitlementEvaluator};
pub use features::Feature;
pub use plans::{DeviceLimit, PlanFeatureSet, PlanId, SupportLevel, VideoQuality, PLANS};
