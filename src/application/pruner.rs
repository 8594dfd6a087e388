//! Periodic pruning of expired rate-limit windows.
//!
//! Windows are pruned lazily on every check, but a key that is never checked
//! again keeps its (expired) window forever. The pruner sweeps those away
//! at a fixed interval.

use crate::application::limiter::RateLimiter;
use crate::application::ports::Storage;
use crate::domain::{operation::RateLimitKey, window::SlidingWindow};
use std::time::Duration;

#[cfg(feature = "async")]
use tokio::time::interval;

/// Error returned when pruner configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrunerConfigError {
    /// Prune interval duration must be greater than zero
    ZeroInterval,
}

impl std::fmt::Display for PrunerConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrunerConfigError::ZeroInterval => write!(f, "prune interval must be greater than 0"),
        }
    }
}

impl std::error::Error for PrunerConfigError {}

/// Configuration for background pruning.
#[derive(Debug, Clone)]
pub struct PrunerConfig {
    /// How often to sweep
    pub interval: Duration,
}

impl Default for PrunerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl PrunerConfig {
    /// Create a new pruner config with the specified interval.
    ///
    /// # Errors
    /// Returns `PrunerConfigError::ZeroInterval` if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, PrunerConfigError> {
        if interval.is_zero() {
            return Err(PrunerConfigError::ZeroInterval);
        }
        Ok(Self { interval })
    }
}

/// Sweeps expired windows out of a limiter.
pub struct Pruner<S>
where
    S: Storage<RateLimitKey, SlidingWindow> + Clone,
{
    limiter: RateLimiter<S>,
    config: PrunerConfig,
}

impl<S> Pruner<S>
where
    S: Storage<RateLimitKey, SlidingWindow> + Clone,
{
    /// Create a pruner for a limiter. The limiter is a cheap shared clone.
    pub fn new(limiter: RateLimiter<S>, config: PrunerConfig) -> Self {
        Self { limiter, config }
    }

    /// Run one sweep now. Returns the number of keys removed.
    pub fn sweep(&self) -> usize {
        self.limiter.prune_expired()
    }

    /// Start sweeping periodically on the current tokio runtime.
    #[cfg(feature = "async")]
    pub fn start(self) -> PrunerHandle
    where
        S: Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(self.config.interval);
            // The first tick completes immediately; nothing can be expired yet.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.sweep();
            }
        });
        PrunerHandle { handle }
    }

    /// Get the pruner configuration.
    pub fn config(&self) -> &PrunerConfig {
        &self.config
    }
}

/// Handle to a running background pruner.
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct PrunerHandle {
    handle: tokio::task::JoinHandle<()>,
}

#[cfg(feature = "async")]
impl PrunerHandle {
    /// Stop the pruner and wait for the task to finish.
    pub async fn shutdown(self) {
        self.handle.abort();
        // Cancellation is the expected outcome here.
        let _ = self.handle.await;
        tracing::debug!("rate limit pruner stopped");
    }

    /// Check if the background task has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
