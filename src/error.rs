//! Error types for the StreamFlix core.
//!
//! Upstream failures are split by kind so callers can tell "rate limited,
//! retry later" (`RateLimited`) apart from a missing resource or a transient
//! transport problem. The entitlement evaluator never produces errors.

use std::time::Duration;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StreamflixError>;

#[derive(Debug, Error)]
pub enum StreamflixError {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Upstream answered HTTP 429.
    #[error("Rate limited by upstream: {0}")]
    RateLimited(String),

    /// Upstream answered with a non-2xx status other than 429.
    #[error("Upstream returned HTTP {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// The response body was not the JSON we expected.
    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    /// Waiting for a rate-limiter slot would exceed the configured bound.
    #[error("Rate limiter admission would exceed max wait of {0:?}")]
    AdmissionTimeout(Duration),

    /// The caller cancelled while waiting for a rate-limiter slot.
    #[error("Rate limiter admission cancelled")]
    Cancelled,
}

impl StreamflixError {
    /// HTTP status the API tier reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RateLimited(_) => 429,
            Self::UpstreamStatus { status: 404, .. } => 404,
            Self::UpstreamStatus { .. } | Self::Upstream(_) | Self::Decode(_) => 502,
            Self::AdmissionTimeout(_) | Self::Cancelled => 503,
            Self::Config(_) | Self::Io(_) | Self::Json(_) => 500,
        }
    }

    /// True when the error came from upstream throttling.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// True when upstream answered 404 for the requested resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UpstreamStatus { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        let missing = StreamflixError::UpstreamStatus {
            status: 404,
            message: "The resource you requested could not be found.".into(),
        };
        assert!(missing.is_not_found());
        assert!(!StreamflixError::Upstream("reset".into()).is_not_found());
        assert!(!StreamflixError::UpstreamStatus {
            status: 500,
            message: "Internal error".into(),
        }
        .is_not_found());
    }

    #[test]
    fn test_rate_limited_maps_to_429() {
        let err = StreamflixError::RateLimited("slow down".into());
        assert_eq!(err.status_code(), 429);
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_upstream_not_found_keeps_404() {
        let err = StreamflixError::UpstreamStatus {
            status: 404,
            message: "The resource you requested could not be found.".into(),
        };
        assert_eq!(err.status_code(), 404);
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_upstream_failures_map_to_bad_gateway() {
        assert_eq!(StreamflixError::Upstream("dns".into()).status_code(), 502);
        assert_eq!(StreamflixError::Decode("eof".into()).status_code(), 502);
        assert_eq!(
            StreamflixError::UpstreamStatus {
                status: 500,
                message: "boom".into()
            }
            .status_code(),
            502
        );
    }

    #[test]
    fn test_admission_errors_map_to_unavailable() {
        let err = StreamflixError::AdmissionTimeout(Duration::from_secs(2));
        assert_eq!(err.status_code(), 503);
        assert!(err.to_string().contains("max wait"));
        assert_eq!(StreamflixError::Cancelled.status_code(), 503);
    }
}
