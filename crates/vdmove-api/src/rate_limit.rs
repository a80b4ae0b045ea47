//! Rate limiting for the disk API
//!
//! The API allows a fixed number of calls per second. [`RateLimiter`] keeps a
//! log of the calls it admitted and never admits more than `max_calls` within
//! any trailing window, whatever the arrival pattern.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vdmove_api::rate_limit::RateLimiter;
//!
//! # async fn example() {
//! let limiter = RateLimiter::per_second(10);
//! limiter.wait_if_needed().await;
//! // ... make API call ...
//! # }
//! ```

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::time::Instant;
use tracing::debug;

/// Calls admitted per window when nothing else is configured
pub const DEFAULT_MAX_CALLS: u32 = 10;

/// Length of the trailing window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

// ============================================================================
// RateLimitConfig
// ============================================================================

/// Configuration for the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum calls admitted within any trailing `window`; 0 is treated as 1
    pub max_calls: u32,
    /// Length of the trailing window
    pub window: Duration,
}

impl RateLimitConfig {
    /// `max_calls` per one-second window
    pub fn per_second(max_calls: u32) -> Self {
        Self {
            max_calls,
            window: DEFAULT_WINDOW,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_second(DEFAULT_MAX_CALLS)
    }
}

// ============================================================================
// RateLimiter
// ============================================================================

/// Sliding-window call limiter.
///
/// Timestamps of admitted calls live behind a `Mutex` that is never held
/// across an `.await`, so one limiter can be shared via `Arc<RateLimiter>`.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    /// Admission times of calls still inside the window, oldest first
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a new `RateLimiter` with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            calls: Mutex::new(VecDeque::with_capacity(config.max_calls.max(1) as usize)),
        }
    }

    /// Creates a limiter admitting `max_calls` per second.
    pub fn per_second(max_calls: u32) -> Self {
        Self::new(RateLimitConfig::per_second(max_calls))
    }

    /// Creates a limiter with the API default of 10 calls per second.
    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default())
    }

    /// Effective ceiling per window.
    pub fn max_calls(&self) -> u32 {
        self.config.max_calls.max(1)
    }

    /// Length of the trailing window.
    pub fn window(&self) -> Duration {
        self.config.window
    }

    /// Waits until one more call fits in the window, then records it.
    ///
    /// When the window is full, sleeps until its oldest call expires and
    /// re-evaluates, since other callers may have claimed the freed slot.
    pub async fn wait_if_needed(&self) {
        loop {
            let wait = match self.try_admit(Instant::now()) {
                None => return,
                Some(wait) => wait,
            };
            debug!(
                wait_ms = wait.as_millis() as u64,
                max_calls = self.max_calls(),
                "Rate limit window full, waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Number of admitted calls still inside the window.
    pub fn calls_in_window(&self) -> usize {
        let mut calls = self.lock();
        Self::prune(&mut calls, Instant::now(), self.config.window);
        calls.len()
    }

    /// Records a call at `now` if it fits, returning `None`; otherwise
    /// returns how long until the oldest call leaves the window.
    fn try_admit(&self, now: Instant) -> Option<Duration> {
        let window = self.config.window;
        let mut calls = self.lock();
        Self::prune(&mut calls, now, window);

        if calls.len() < self.max_calls() as usize {
            calls.push_back(now);
            return None;
        }

        let oldest = calls.front().copied().unwrap_or(now);
        Some(window.saturating_sub(now.duration_since(oldest)))
    }

    fn prune(calls: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(&oldest) = calls.front() {
            if now.duration_since(oldest) >= window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
