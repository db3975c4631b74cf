//! Cached, rate-limited access to TMDB.
//!
//! Lookup order for every resource:
//!
//! 1. Compute the cache key; on a hit return immediately. No limiter slot
//!    is consumed because no upstream call happens.
//! 2. On a miss (or for uncached resources such as search), wait for a
//!    limiter admission, then fetch.
//! 3. Store successful bodies under the key and return them.
//!
//! What happens on failure depends on the caller's [`FailurePolicy`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::cache::{CacheStats, ResponseCache};
use crate::config::Config;
use crate::error::{Result, StreamflixError};
use crate::ratelimit::SlidingWindowLimiter;

use super::client::{HttpTmdbClient, TmdbClient, UpstreamRequest};
use super::resource::TmdbResource;

/// How [`TmdbGateway::resolve`] treats upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Request-handling tier: log the cause and return a well-formed
    /// placeholder so catalog pages keep rendering.
    #[default]
    Fallback,
    /// Client tier: return an error, except that list resources yield an
    /// empty result page.
    Propagate,
}

/// Cache + limiter + client, explicitly owned and shared by handle.
pub struct TmdbGateway {
    cache: Arc<ResponseCache>,
    limiter: Arc<SlidingWindowLimiter>,
    client: Arc<dyn TmdbClient>,
}

impl std::fmt::Debug for TmdbGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbGateway")
            .field("cache", &self.cache)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl TmdbGateway {
    /// Compose an existing cache, limiter and client.
    ///
    /// Handlers and tests that share a gateway must share these handles;
    /// each gateway enforces its own window.
    pub fn new(
        cache: Arc<ResponseCache>,
        limiter: Arc<SlidingWindowLimiter>,
        client: Arc<dyn TmdbClient>,
    ) -> Self {
        Self {
            cache,
            limiter,
            client,
        }
    }

    /// Build a gateway with a fresh cache, limiter and HTTP client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = HttpTmdbClient::from_config(&config.tmdb)?;
        Ok(Self::new(
            Arc::new(ResponseCache::new(config.cache.ttl())),
            Arc::new(SlidingWindowLimiter::new(&config.rate_limit)),
            Arc::new(client),
        ))
    }

    /// The shared response cache.
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// The shared admission limiter.
    pub fn limiter(&self) -> &Arc<SlidingWindowLimiter> {
        &self.limiter
    }

    /// Fetch `resource`, serving from cache when possible. Upstream errors
    /// are returned unchanged.
    pub async fn fetch(&self, resource: &TmdbResource) -> Result<Value> {
        let key = resource.cache_key();
        if let Some(key) = key.as_deref() {
            if let Some(hit) = self.cache.get(key) {
                return Ok(hit);
            }
        }

        let request = UpstreamRequest::new(resource.path(), resource.query());
        let body = self
            .limiter
            .run(|| self.client.fetch(&request))
            .await?;

        if let Some(key) = key {
            debug!(key = %key, "Caching upstream response");
            self.cache.set(key, body.clone());
        }
        Ok(body)
    }

    /// Fetch `resource` and apply `policy` to failures.
    ///
    /// Upstream 429 and 404 are always returned as errors, whatever the
    /// policy, so callers can tell "retry later" from "no such resource".
    /// Only transport, decoding and other upstream failures are recovered.
    pub async fn resolve(&self, resource: &TmdbResource, policy: FailurePolicy) -> Result<Value> {
        match self.fetch(resource).await {
            Ok(body) => Ok(body),
            Err(e) if e.is_rate_limited() || e.is_not_found() => Err(e),
            Err(e) => match policy {
                FailurePolicy::Fallback => {
                    warn!(
                        resource = %resource,
                        error = %e,
                        "TMDB fetch failed, serving placeholder"
                    );
                    Ok(placeholder(resource))
                }
                FailurePolicy::Propagate if resource.is_list() => {
                    warn!(
                        resource = %resource,
                        error = %e,
                        "TMDB list fetch failed, returning empty results"
                    );
                    Ok(empty_page())
                }
                FailurePolicy::Propagate => Err(e),
            },
        }
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Snapshot of cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Empty TMDB result page.
pub fn empty_page() -> Value {
    json!({
        "page": 1,
        "results": [],
        "total_pages": 0,
        "total_results": 0,
    })
}

/// Well-formed stand-in for a resource that could not be fetched.
/// Never cached.
pub fn placeholder(resource: &TmdbResource) -> Value {
    match resource {
        TmdbResource::Movie(id) => json!({
            "id": id,
            "title": "Unavailable",
            "overview": "Details for this title are temporarily unavailable.",
            "genres": [],
            "videos": { "results": [] },
            "credits": { "cast": [], "crew": [] },
            "placeholder": true,
        }),
        TmdbResource::Tv(id) => json!({
            "id": id,
            "name": "Unavailable",
            "overview": "Details for this show are temporarily unavailable.",
            "genres": [],
            "seasons": [],
            "videos": { "results": [] },
            "credits": { "cast": [], "crew": [] },
            "placeholder": true,
        }),
        TmdbResource::TvSeason { season, .. } => json!({
            "season_number": season,
            "name": format!("Season {season}"),
            "episodes": [],
            "placeholder": true,
        }),
        _ => {
            let mut page = empty_page();
            page["placeholder"] = json!(true);
            page
        }
    }
}
