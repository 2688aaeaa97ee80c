//! Per-caller sliding-window rate limiting.
//!
//! Each caller gets a window of admission timestamps. Before every decision
//! the timestamps older than the interval are pruned; the call is admitted
//! only if fewer than `max_calls` remain. Rejections leave no trace, so a
//! throttled caller is not pushed further back by retrying.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Identifier of a caller (chat user or chat id).
pub type CallerId = i64;

/// Configuration for per-caller admission control.
///
/// ```rust
/// # use cardseer::RateLimitConfig;
/// # use std::time::Duration;
/// let config = RateLimitConfig::new()
///     .max_calls(5)
///     .interval(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Calls admitted per caller within one interval. Default: 10.
    pub max_calls: usize,
    /// Length of the trailing window. Default: 60s.
    pub interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: 10,
            interval: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_calls(mut self, n: usize) -> Self {
        self.max_calls = n;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Sliding-window limiter keyed by caller.
///
/// Windows are created lazily and live for the lifetime of the limiter.
/// The prune-check-record sequence runs under one lock, so two concurrent
/// calls for the same caller can never both take the last slot.
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<CallerId, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Admit or reject one call from `caller`.
    pub fn allow(&self, caller: CallerId) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let window = windows.entry(caller).or_default();

        while let Some(&oldest) = window.front() {
            if now.duration_since(oldest) > self.config.interval {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() < self.config.max_calls {
            window.push_back(now);
            true
        } else {
            debug!(caller, in_window = window.len(), "caller throttled");
            false
        }
    }

    /// Calls `caller` could still make right now without being rejected.
    ///
    /// Does not record anything; timestamps outside the window are ignored
    /// rather than pruned.
    pub fn remaining(&self, caller: CallerId) -> usize {
        let now = Instant::now();
        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let used = windows.get(&caller).map_or(0, |window| {
            window
                .iter()
                .filter(|&&t| now.duration_since(t) <= self.config.interval)
                .count()
        });
        self.config.max_calls.saturating_sub(used)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_max_calls() {
        let limiter = RateLimiter::new(RateLimitConfig::new().max_calls(3));
        assert!(limiter.allow(1));
        assert!(limiter.allow(1));
        assert!(limiter.allow(1));
        assert!(!limiter.allow(1));
        assert_eq!(limiter.remaining(1), 0);
    }

    #[test]
    fn callers_are_independent() {
        let limiter = RateLimiter::new(RateLimitConfig::new().max_calls(1));
        assert!(limiter.allow(1));
        assert!(!limiter.allow(1));
        assert!(limiter.allow(2));
    }

    #[test]
    fn zero_max_calls_rejects_everything() {
        let limiter = RateLimiter::new(RateLimitConfig::new().max_calls(0));
        assert!(!limiter.allow(7));
    }
}
