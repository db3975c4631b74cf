//! Upstream response caching with a fixed TTL and lazy eviction.

pub mod response_cache;

pub use response_cache::{CacheStats, ResponseCache};
