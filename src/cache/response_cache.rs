//! Upstream response cache with a single TTL and lazy eviction.
//!
//! Keys are the deterministic resource keys produced by
//! [`TmdbResource::cache_key`](crate::tmdb::TmdbResource::cache_key)
//! (`"popular"`, `"movie-603"`, `"tv-1399-season-2"`, ...). An entry is valid
//! while `now - stored_at < ttl`; once it is not, the next `get()` removes it.
//! Nothing sweeps the map in the background: key cardinality is bounded by
//! the number of distinct upstream resources, not by request volume.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

/// A single cached payload.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    payload: V,
    /// Monotonic insertion instant; the only input to the validity check.
    stored_at: Instant,
    /// Wall-clock insertion time, for reporting.
    stored_at_utc: DateTime<Utc>,
}

/// Time-bounded key/value store for decoded upstream responses.
///
/// Methods take `&self`; the map sits behind a mutex so a single instance
/// can be shared through an `Arc` by the gateway and the HTTP layer.
pub struct ResponseCache<V = serde_json::Value> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl<V: Clone> ResponseCache<V> {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    /// How long an entry stays fresh after `set`.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a payload. Returns `None` if the key is absent or expired.
    ///
    /// An expired entry is removed as part of this call.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();
        let expired = entries
            .get(key)
            .map(|e| now.saturating_duration_since(e.stored_at) >= self.ttl);
        match expired {
            Some(false) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache hit");
                entries.get(key).map(|e| e.payload.clone())
            }
            Some(true) => {
                entries.remove(key);
                self.expired.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache entry expired, removing");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache miss");
                None
            }
        }
    }

    /// Insert or overwrite `key`, starting a fresh TTL window.
    pub fn set(&self, key: impl Into<String>, payload: V) {
        let entry = CacheEntry {
            payload,
            stored_at: Instant::now(),
            stored_at_utc: Utc::now(),
        };
        self.lock().insert(key.into(), entry);
    }

    /// Remove every entry unconditionally.
    pub fn clear(&self) {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        debug!(removed, "Response cache cleared");
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is stored, fresh or expired.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Wall-clock time at which `key` was stored, if it is still present.
    pub fn stored_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.lock().get(key).map(|e| e.stored_at_utc)
    }

    /// Aggregate counters. Purely observational.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            ttl_secs: self.ttl.as_secs(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // Entries are plain data; a panic elsewhere cannot leave one half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Aggregate cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently stored.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing valid.
    pub misses: u64,
    /// Misses caused by an expired entry.
    pub expired: u64,
    pub ttl_secs: u64,
}
