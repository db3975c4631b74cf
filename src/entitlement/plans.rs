//! Subscription plans and their static feature table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Subscription plan identifier, ordered by capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    /// Lowest-privilege plan; also the fallback for unknown identifiers.
    #[default]
    Free,
    Basic,
    Standard,
    Premium,
    Vip,
}

impl PlanId {
    /// Every plan, cheapest first.
    pub const ALL: [PlanId; 5] = [
        PlanId::Free,
        PlanId::Basic,
        PlanId::Standard,
        PlanId::Premium,
        PlanId::Vip,
    ];

    /// Parse a plan identifier as stored on a subscription record.
    ///
    /// Case-insensitive, surrounding whitespace ignored. Returns `None` for
    /// anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Self::Free),
            "basic" => Some(Self::Basic),
            "standard" => Some(Self::Standard),
            "premium" => Some(Self::Premium),
            "vip" => Some(Self::Vip),
            _ => None,
        }
    }

    /// Like [`parse`](Self::parse) but unknown identifiers resolve to
    /// [`PlanId::Free`], never to a more privileged plan.
    pub fn parse_or_default(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }

    /// Lowercase identifier, as stored on subscriptions.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Vip => "vip",
        }
    }

    /// The plan's feature record.
    pub fn features(self) -> &'static PlanFeatureSet {
        match self {
            Self::Free => &PLANS[0],
            Self::Basic => &PLANS[1],
            Self::Standard => &PLANS[2],
            Self::Premium => &PLANS[3],
            Self::Vip => &PLANS[4],
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum streaming resolution, compared by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VideoQuality {
    #[serde(rename = "SD")]
    Sd,
    #[serde(rename = "HD")]
    Hd,
    #[serde(rename = "4K")]
    Uhd4k,
}

impl VideoQuality {
    /// Parse `"SD"`, `"HD"` or `"4K"` (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SD" => Some(Self::Sd),
            "HD" => Some(Self::Hd),
            "4K" | "UHD" => Some(Self::Uhd4k),
            _ => None,
        }
    }

    /// Display label: `"SD"`, `"HD"` or `"4K"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sd => "SD",
            Self::Hd => "HD",
            Self::Uhd4k => "4K",
        }
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer support tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    Basic,
    Priority,
    Vip,
}

impl SupportLevel {
    /// Priority and VIP both count as priority support.
    pub fn has_priority(self) -> bool {
        matches!(self, Self::Priority | Self::Vip)
    }
}

/// How many devices may stream on one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceLimit {
    Unlimited,
    Bounded(u32),
}

impl DeviceLimit {
    /// True when `current` connected devices leave room for one more.
    pub fn allows_another(self, current: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Bounded(max) => current < max,
        }
    }

    /// True when more than one device is allowed.
    pub fn is_multi_device(self) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Bounded(max) => max > 1,
        }
    }
}

/// Capabilities granted by one plan. Immutable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanFeatureSet {
    pub id: PlanId,
    /// Display label.
    pub name: &'static str,
    /// Monthly list price, for display only.
    pub monthly_price_cents: u32,
    pub max_devices: DeviceLimit,
    pub max_video_quality: VideoQuality,
    pub can_download: bool,
    pub has_exclusive: bool,
    pub early_access_allowed: bool,
    pub ads: bool,
    pub support_level: SupportLevel,
}

/// The plan table, cheapest first. Indexed by [`PlanId::features`].
pub static PLANS: [PlanFeatureSet; 5] = [
    PlanFeatureSet {
        id: PlanId::Free,
        name: "Free",
        monthly_price_cents: 0,
        max_devices: DeviceLimit::Bounded(1),
        max_video_quality: VideoQuality::Sd,
        can_download: false,
        has_exclusive: false,
        early_access_allowed: false,
        ads: true,
        support_level: SupportLevel::Basic,
    },
    PlanFeatureSet {
        id: PlanId::Basic,
        name: "Basic",
        monthly_price_cents: 899,
        max_devices: DeviceLimit::Bounded(1),
        max_video_quality: VideoQuality::Hd,
        can_download: false,
        has_exclusive: false,
        early_access_allowed: false,
        ads: false,
        support_level: SupportLevel::Basic,
    },
    PlanFeatureSet {
        id: PlanId::Standard,
        name: "Standard",
        monthly_price_cents: 1399,
        max_devices: DeviceLimit::Bounded(2),
        max_video_quality: VideoQuality::Hd,
        can_download: true,
        has_exclusive: false,
        early_access_allowed: false,
        ads: false,
        support_level: SupportLevel::Basic,
    },
    PlanFeatureSet {
        id: PlanId::Premium,
        name: "Premium",
        monthly_price_cents: 1999,
        max_devices: DeviceLimit::Bounded(4),
        max_video_quality: VideoQuality::Uhd4k,
        can_download: true,
        has_exclusive: true,
        early_access_allowed: false,
        ads: false,
        support_level: SupportLevel::Priority,
    },
    PlanFeatureSet {
        id: PlanId::Vip,
        name: "VIP",
        monthly_price_cents: 2999,
        max_devices: DeviceLimit::Unlimited,
        max_video_quality: VideoQuality::Uhd4k,
        can_download: true,
        has_exclusive: true,
        early_access_allowed: true,
        ads: false,
        support_level: SupportLevel::Vip,
    },
];
