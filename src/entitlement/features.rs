//! Named feature checks.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::plans::{PlanFeatureSet, VideoQuality};

/// Closed set of gated features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "download")]
    Download,
    #[serde(rename = "hd")]
    Hd,
    #[serde(rename = "4k")]
    Uhd4k,
    #[serde(rename = "exclusive")]
    Exclusive,
    #[serde(rename = "prioritySupport")]
    PrioritySupport,
    #[serde(rename = "earlyAccess")]
    EarlyAccess,
    #[serde(rename = "noAds")]
    NoAds,
    #[serde(rename = "multipleDevices")]
    MultipleDevices,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Download,
        Feature::Hd,
        Feature::Uhd4k,
        Feature::Exclusive,
        Feature::PrioritySupport,
        Feature::EarlyAccess,
        Feature::NoAds,
        Feature::MultipleDevices,
    ];

    /// Parse the wire name (`"download"`, `"4k"`, `"prioritySupport"`, ...).
    ///
    /// Exact match only; anything else is `None` and callers must deny.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == raw)
    }

    /// Wire name used by clients, e.g. `"prioritySupport"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Hd => "hd",
            Self::Uhd4k => "4k",
            Self::Exclusive => "exclusive",
            Self::PrioritySupport => "prioritySupport",
            Self::EarlyAccess => "earlyAccess",
            Self::NoAds => "noAds",
            Self::MultipleDevices => "multipleDevices",
        }
    }

    /// Evaluate this feature against a plan's record.
    pub fn granted_by(self, plan: &PlanFeatureSet) -> bool {
        match self {
            Self::Download => plan.can_download,
            Self::Hd => plan.max_video_quality >= VideoQuality::Hd,
            Self::Uhd4k => plan.max_video_quality >= VideoQuality::Uhd4k,
            Self::Exclusive => plan.has_exclusive,
            Self::PrioritySupport => plan.support_level.has_priority(),
            Self::EarlyAccess => plan.early_access_allowed,
            Self::NoAds => !plan.ads,
            Self::MultipleDevices => plan.max_devices.is_multi_device(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
