//! Rate limiter coordination logic.
//!
//! The rate limiter decides whether an operation may proceed for a caller,
//! using one sliding window per `(operation, caller)` key.

use crate::application::metrics::Metrics;
use crate::application::ports::Storage;
use crate::application::registry::WindowRegistry;
use crate::domain::{
    operation::RateLimitKey,
    window::{SlidingWindow, WindowDecision},
};
use std::time::Duration;

/// Decision for one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The operation may proceed; the attempt was recorded
    Allowed,
    /// Too many recent attempts; try again after the given number of seconds
    Limited {
        /// Whole seconds until the oldest attempt leaves the window (at least 1)
        retry_after_secs: u64,
    },
}

impl RateLimitDecision {
    /// Check if the operation may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }

    /// Check if the operation was refused.
    pub fn is_limited(&self) -> bool {
        matches!(self, RateLimitDecision::Limited { .. })
    }

    /// Wait time before retrying, if refused.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RateLimitDecision::Allowed => None,
            RateLimitDecision::Limited { retry_after_secs } => {
                Some(Duration::from_secs(*retry_after_secs))
            }
        }
    }
}

/// Round a wait time up to whole seconds, never reporting zero.
fn ceil_secs(wait: Duration) -> u64 {
    let secs = if wait.subsec_nanos() > 0 {
        wait.as_secs().saturating_add(1)
    } else {
        wait.as_secs()
    };
    secs.max(1)
}

/// Coordinates rate limiting decisions.
///
/// Cloning is cheap and clones share state, so one limiter can be handed to
/// every request handler in a process. Separate instances never share
/// windows, which keeps tests isolated.
///
/// # Example
/// ```
/// use client_governance::{RateLimitKey, RateLimiter};
///
/// let limiter = RateLimiter::builder().build().unwrap();
/// let key = RateLimitKey::checkout("user-42");
///
/// for _ in 0..3 {
///     assert!(limiter.check(&key).is_allowed());
/// }
/// assert!(limiter.check(&key).is_limited());
///
/// // A successful checkout clears the caller's history.
/// limiter.reset(&key);
/// assert!(limiter.check(&key).is_allowed());
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiter<S>
where
    S: Storage<RateLimitKey, SlidingWindow> + Clone,
{
    registry: WindowRegistry<S>,
    metrics: Metrics,
}

impl<S> RateLimiter<S>
where
    S: Storage<RateLimitKey, SlidingWindow> + Clone,
{
    /// Create a new rate limiter.
    ///
    /// # Arguments
    /// * `registry` - The window registry (which contains the clock)
    /// * `metrics` - Metrics tracker
    pub fn new(registry: WindowRegistry<S>, metrics: Metrics) -> Self {
        Self { registry, metrics }
    }

    /// Check whether `key` may perform its operation now.
    ///
    /// Prunes expired attempts, then either records this attempt and allows
    /// it, or refuses it with the time until a slot frees up. Refused
    /// attempts are not recorded. Never panics and never errors.
    pub fn check(&self, key: &RateLimitKey) -> RateLimitDecision {
        let decision = self
            .registry
            .with_window(key, |window, now| window.register(now));

        match decision {
            WindowDecision::Admitted => {
                self.metrics.record_allowed();
                tracing::debug!(key = %key, "rate limit check allowed");
                RateLimitDecision::Allowed
            }
            WindowDecision::Full { retry_after } => {
                self.metrics.record_limited();
                let retry_after_secs = ceil_secs(retry_after);
                tracing::debug!(
                    key = %key,
                    retry_after_secs,
                    "rate limit exceeded"
                );
                RateLimitDecision::Limited { retry_after_secs }
            }
        }
    }

    /// Forget all attempts recorded for `key`.
    ///
    /// Call after a successful operation so legitimate retries are not
    /// penalized for earlier failures.
    pub fn reset(&self, key: &RateLimitKey) {
        if self.registry.remove(key) {
            self.metrics.record_reset();
            tracing::debug!(key = %key, "rate limit reset");
        }
    }

    /// Attempts `key` could still make right now, without recording one.
    pub fn remaining(&self, key: &RateLimitKey) -> u32 {
        self.registry
            .with_existing_window(key, |window, now| window.remaining(now))
            .unwrap_or_else(|| self.registry.table().window_for(key.operation()).max_attempts())
    }

    /// Drop every key whose recorded attempts have all expired.
    ///
    /// Returns the number of keys removed. Dropping such a key is
    /// indistinguishable from keeping it, so this only reclaims memory.
    pub fn prune_expired(&self) -> usize {
        let mut pruned = 0usize;
        self.registry.cleanup(|_key, window, now| {
            let keep = !window.is_expired(now);
            if !keep {
                pruned += 1;
            }
            keep
        });

        if pruned > 0 {
            self.metrics.record_pruned(pruned as u64);
            tracing::debug!(pruned, remaining = self.registry.len(), "pruned expired rate limit keys");
        }
        pruned
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.registry.len()
    }

    /// Get a reference to the registry.
    pub fn registry(&self) -> &WindowRegistry<S> {
        &self.registry
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
