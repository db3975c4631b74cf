//! Sliding-window rate limiter.
//!
//! Keeps the instants of recent admissions in a deque. Before every
//! admission check, instants older than the window are pruned; if fewer than
//! `max_requests` remain the caller is admitted and its instant recorded,
//! otherwise the caller sleeps until the oldest instant leaves the window
//! (plus a small safety margin) and checks again.
//!
//! Calls are delayed, never rejected, unless a `max_wait` bound or a
//! cancellation token says otherwise.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::error::{Result, StreamflixError};

/// Outcome of one admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Granted(Instant),
    Wait(Duration),
}

/// Sliding-window admission controller.
///
/// Guarantees only the global ceiling: no trailing window of length
/// `time_window` ever holds more than `max_requests` admissions. It is
/// **not** FIFO-fair. Waiters re-check independently after their own sleep,
/// so under contention a later caller can be admitted before an earlier one.
pub struct SlidingWindowLimiter {
    timestamps: Mutex<VecDeque<Instant>>,
    max_requests: usize,
    time_window: Duration,
    safety_margin: Duration,
    max_wait: Option<Duration>,
}

impl SlidingWindowLimiter {
    /// `max_requests` is clamped to at least 1 so the wait loop always
    /// has an oldest instant to wait on.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            timestamps: Mutex::new(VecDeque::new()),
            max_requests: config.max_requests.max(1),
            time_window: config.window(),
            safety_margin: config.safety_margin(),
            max_wait: config.max_wait(),
        }
    }

    /// Admissions allowed per window, after clamping.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Length of the trailing window.
    pub fn time_window(&self) -> Duration {
        self.time_window
    }

    /// Suspend until a call may proceed, then record and return its
    /// admission instant.
    ///
    /// Fails with [`StreamflixError::AdmissionTimeout`] only when `max_wait`
    /// is configured and the next sleep would exceed it.
    pub async fn admit(&self) -> Result<Instant> {
        self.admit_inner(None).await
    }

    /// Like [`admit`](Self::admit), but gives up with
    /// [`StreamflixError::Cancelled`] as soon as `cancel` fires.
    pub async fn admit_with_cancel(&self, cancel: &CancellationToken) -> Result<Instant> {
        self.admit_inner(Some(cancel)).await
    }

    /// Admit, then run `call`.
    pub async fn run<F, Fut, T>(&self, call: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.admit().await?;
        call().await
    }

    /// Admissions currently inside the trailing window.
    pub fn in_flight_window(&self) -> usize {
        let now = Instant::now();
        let mut timestamps = self.lock();
        self.prune(&mut timestamps, now);
        timestamps.len()
    }

    async fn admit_inner(&self, cancel: Option<&CancellationToken>) -> Result<Instant> {
        let started = Instant::now();
        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(StreamflixError::Cancelled);
            }

            let wait = match self.try_admit() {
                Attempt::Granted(at) => return Ok(at),
                Attempt::Wait(wait) => wait,
            };

            if let Some(max_wait) = self.max_wait {
                let waited = Instant::now().saturating_duration_since(started);
                if waited + wait > max_wait {
                    warn!(
                        waited_ms = waited.as_millis() as u64,
                        needed_ms = wait.as_millis() as u64,
                        "Rate limiter admission would exceed max wait"
                    );
                    return Err(StreamflixError::AdmissionTimeout(max_wait));
                }
            }

            debug!(
                wait_ms = wait.as_millis() as u64,
                max_requests = self.max_requests,
                "Rate limit window full, delaying call"
            );

            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => return Err(StreamflixError::Cancelled),
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
                None => tokio::time::sleep(wait).await,
            }
            // The window may have changed while we slept; re-check from the top.
        }
    }

    fn try_admit(&self) -> Attempt {
        let mut timestamps = self.lock();
        // Read the clock under the lock so recorded instants stay ordered.
        let now = Instant::now();
        self.prune(&mut timestamps, now);

        if timestamps.len() < self.max_requests {
            timestamps.push_back(now);
            return Attempt::Granted(now);
        }

        let age = timestamps
            .front()
            .map(|oldest| now.saturating_duration_since(*oldest))
            .unwrap_or_default();
        Attempt::Wait(self.time_window.saturating_sub(age) + self.safety_margin)
    }

    fn prune(&self, timestamps: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = timestamps.front() {
            if now.saturating_duration_since(*oldest) >= self.time_window {
                let _ = timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        self.timestamps.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SlidingWindowLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowLimiter")
            .field("max_requests", &self.max_requests)
            .field("time_window", &self.time_window)
            .field("max_wait", &self.max_wait)
            .finish()
    }
}
