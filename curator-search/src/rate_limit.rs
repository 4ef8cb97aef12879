//! Sliding-window rate limiter for provider calls.
//!
//! Each key owns an append-only list of call timestamps. Reads filter the
//! list against the requested window; nothing is persisted, so counts reset
//! on restart. The limiter is best-effort: it is the process-wide throttle on
//! provider usage, shared by every pipeline that holds a reference to it.
//!
//! Time is read through [`tokio::time::Instant`] so tests can drive it with a
//! paused clock.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Entries older than this are dropped by [`RateLimiter::cleanup`].
pub const RETENTION: Duration = Duration::from_secs(60 * 60);

/// A ceiling of `max_requests` calls per `window_ms` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_ms: u64,
}

impl RateLimitConfig {
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Per-key sliding-window call tracker.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Vec<Instant>>>,
    retention: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    /// Create an empty limiter with the standard one-hour retention.
    pub fn new() -> Self {
        Self::with_retention(RETENTION)
    }

    /// Create an empty limiter with a custom retention horizon.
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            retention,
        }
    }

    // The map only ever holds timestamps, so state behind a poisoned lock is
    // still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Instant>>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a call against `key` at the current instant.
    pub fn track(&self, key: &str) {
        let mut windows = self.lock();
        // Read the clock under the lock so each window stays ordered.
        let now = Instant::now();
        let entries = windows.entry(key.to_string()).or_default();
        if let Some(horizon) = now.checked_sub(self.retention) {
            let expired = entries.partition_point(|t| *t < horizon);
            entries.drain(..expired);
        }
        entries.push(now);
    }

    /// Returns `true` when `key` already has `max_requests` calls inside the
    /// last `window_ms`.
    pub fn is_limited(&self, key: &str, config: RateLimitConfig) -> bool {
        let windows = self.lock();
        let Some(entries) = windows.get(key) else {
            return config.max_requests == 0;
        };
        in_window(entries, Instant::now(), config.window()).len() >= config.max_requests as usize
    }

    /// When the next call for `key` will be permitted, or `None` if it is
    /// permitted now. Agrees with [`RateLimiter::is_limited`]: `Some` exactly
    /// when that returns `true`.
    ///
    /// Returns the instant at which enough of the window's entries have aged
    /// out to bring the count below `max_requests`. With exactly
    /// `max_requests` entries this is the oldest entry plus the window. When
    /// the window holds more entries than the ceiling (calls tracked while
    /// already limited), the oldest entry alone aging out is not enough, so
    /// the entry at `len - max_requests` decides instead.
    ///
    /// A ceiling of zero never frees up; the current instant is returned.
    pub fn next_available_at(&self, key: &str, config: RateLimitConfig) -> Option<Instant> {
        let now = Instant::now();
        let max = config.max_requests as usize;
        if max == 0 {
            return Some(now);
        }
        let windows = self.lock();
        let entries = windows.get(key)?;
        let recent = in_window(entries, now, config.window());
        if recent.len() < max {
            return None;
        }
        Some(recent[recent.len() - max] + config.window())
    }

    /// Drop keys whose latest call is older than the retention horizon and
    /// prune expired entries from the rest. Returns how many keys were removed.
    pub fn cleanup(&self) -> usize {
        let mut windows = self.lock();
        let Some(horizon) = Instant::now().checked_sub(self.retention) else {
            return 0;
        };
        let before = windows.len();
        windows.retain(|_, entries| {
            let expired = entries.partition_point(|t| *t < horizon);
            entries.drain(..expired);
            !entries.is_empty()
        });
        let removed = before - windows.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = windows.len(), "rate limiter swept");
        }
        removed
    }

    /// Number of keys currently tracked.
    pub fn key_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of tracked calls per key (including entries outside any window).
    pub fn usage_report(&self) -> Vec<(String, usize)> {
        self.lock()
            .iter()
            .map(|(key, entries)| (key.clone(), entries.len()))
            .collect()
    }

    /// Run [`cleanup`](Self::cleanup) every `every` on the tokio runtime.
    ///
    /// The task holds its own reference to the limiter and runs until aborted.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                limiter.cleanup();
            }
        })
    }
}

/// The suffix of `entries` newer than `now - window`.
fn in_window(entries: &[Instant], now: Instant, window: Duration) -> &[Instant] {
    match now.checked_sub(window) {
        Some(cutoff) => {
            let start = entries.partition_point(|t| *t <= cutoff);
            &entries[start..]
        }
        None => entries,
    }
}
