//! `streamflix plans` and `streamflix check` command handlers.

use anyhow::Result;

use streamflix::config::Config;
use streamflix::entitlement::{EntitlementEvaluator, Feature, PlanFeatureSet, PlanId, PLANS};

use super::CheckTarget;

/// Print the plan table, or the summary of one plan.
pub(crate) fn cmd_plans(config: &Config, plan: Option<&str>) -> Result<()> {
    let evaluator = EntitlementEvaluator::new(&config.entitlements);

    if let Some(raw) = plan {
        if PlanId::parse(raw).is_none() {
            println!("Unknown plan '{}', showing the default plan.", raw);
        }
        let summary = evaluator.summary(raw);
        println!("{} ({})", summary.name, summary.plan);
        for line in summary.lines {
            println!("  - {}", line);
        }
        return Ok(());
    }

    println!(
        "{:<10} {:<10} {:<10} {:<8} {:<9} {:<9} {:<6} {:<8}",
        "Plan", "Price", "Devices", "Quality", "Download", "Exclusive", "Ads", "Support"
    );
    println!("{}", "-".repeat(76));
    for plan in &PLANS {
        println!("{}", plan_row(plan, &evaluator));
    }
    Ok(())
}

fn plan_row(plan: &PlanFeatureSet, evaluator: &EntitlementEvaluator) -> String {
    let devices = evaluator.device_limit(plan.id.as_str(), 0);
    let devices = if devices.unlimited {
        "unlimited".to_string()
    } else {
        devices.max.to_string()
    };
    format!(
        "{:<10} {:<10} {:<10} {:<8} {:<9} {:<9} {:<6} {:<8}",
        plan.name,
        format!("${:.2}", f64::from(plan.monthly_price_cents) / 100.0),
        devices,
        plan.max_video_quality.as_str(),
        yes_no(plan.can_download),
        yes_no(plan.has_exclusive),
        yes_no(plan.ads),
        format!("{:?}", plan.support_level).to_lowercase(),
    )
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

/// Answer one entitlement question and print the verdict.
pub(crate) fn cmd_check(config: &Config, plan: &str, what: &CheckTarget) -> Result<()> {
    let evaluator = EntitlementEvaluator::new(&config.entitlements);
    println!("{}", check_message(&evaluator, plan, what));
    Ok(())
}

fn check_message(evaluator: &EntitlementEvaluator, plan: &str, what: &CheckTarget) -> String {
    let resolved = evaluator.features_for(plan).id;
    match what {
        CheckTarget::Feature { name } => {
            if evaluator.has_feature_named(plan, name) {
                return format!("{resolved}: '{name}' allowed");
            }
            match Feature::parse(name).and_then(|f| evaluator.minimum_plan_for(f)) {
                Some(upgrade) => format!("{resolved}: '{name}' denied (available from {upgrade})"),
                None => format!("{resolved}: '{name}' denied (unknown feature)"),
            }
        }
        CheckTarget::Quality { quality } => {
            let verdict = if evaluator.can_access_quality_named(plan, quality) {
                "allowed"
            } else {
                "denied"
            };
            format!(
                "{resolved}: {quality} {verdict} (max {})",
                evaluator.features_for(plan).max_video_quality
            )
        }
        CheckTarget::Devices { current } => {
            let allowance = evaluator.device_limit(plan, *current);
            format!(
                "{resolved}: {current}/{}{} devices, {}",
                allowance.max,
                if allowance.unlimited { "+" } else { "" },
                if allowance.can_add_more {
                    "can add another"
                } else {
                    "limit reached"
                }
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(name: &str) -> CheckTarget {
        CheckTarget::Feature { name: name.into() }
    }

    fn quality(quality: &str) -> CheckTarget {
        CheckTarget::Quality {
            quality: quality.into(),
        }
    }

    #[test]
    fn test_check_feature_messages() {
        let ev = EntitlementEvaluator::default();
        let msg = check_message(&ev, "premium", &feature("4k"));
        assert_eq!(msg, "premium: '4k' allowed");

        let msg = check_message(&ev, "basic", &feature("download"));
        assert_eq!(msg, "basic: 'download' denied (available from standard)");

        let msg = check_message(&ev, "vip", &feature("warp"));
        assert!(msg.ends_with("(unknown feature)"));
    }

    #[test]
    fn test_check_quality_message() {
        let ev = EntitlementEvaluator::default();
        let msg = check_message(&ev, "standard", &quality("4K"));
        assert_eq!(msg, "standard: 4K denied (max HD)");
    }

    #[test]
    fn test_check_devices_message() {
        let ev = EntitlementEvaluator::default();
        let msg = check_message(&ev, "vip", &CheckTarget::Devices { current: 7 });
        assert_eq!(msg, "vip: 7/10+ devices, can add another");
        let msg = check_message(&ev, "nonexistent", &CheckTarget::Devices { current: 1 });
        assert_eq!(msg, "free: 1/1 devices, limit reached");
    }

    #[test]
    fn test_plan_row_renders_unlimited() {
        let ev = EntitlementEvaluator::default();
        let row = plan_row(PlanId::Vip.features(), &ev);
        assert!(row.contains("unlimited"));
        assert!(row.contains("$29.99"));
    }
}
