//! StreamFlix core: a cached, rate-limited gateway to the TMDB metadata API
//! and the subscription plan entitlement evaluator.
//!
//! The three pieces are independent and explicitly constructed:
//!
//! - [`cache::ResponseCache`]: fixed-TTL response store with lazy eviction
//! - [`ratelimit::SlidingWindowLimiter`]: delays outbound calls to stay
//!   under the upstream request ceiling
//! - [`entitlement::EntitlementEvaluator`]: pure plan to capability mapping
//!
//! [`tmdb::TmdbGateway`] composes the first two around an HTTP client, and
//! [`api`] exposes everything over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod logging;
pub mod ratelimit;
pub mod tmdb;

pub use error::{Result, StreamflixError};
