//! Observability metrics for rate limiting.
//!
//! Provides counters describing limiter behavior for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking rate limiting statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Checks that were admitted
    checks_allowed: AtomicU64,
    /// Checks that were refused
    checks_limited: AtomicU64,
    /// Explicit resets of an existing key
    keys_reset: AtomicU64,
    /// Keys dropped because their window had fully expired
    keys_pruned: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_allowed(&self) {
        self.inner.checks_allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_limited(&self) {
        self.inner.checks_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reset(&self) {
        self.inner.keys_reset.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_pruned(&self, count: u64) {
        self.inner.keys_pruned.fetch_add(count, Ordering::Relaxed);
    }

    /// Get the total number of admitted checks.
    pub fn checks_allowed(&self) -> u64 {
        self.inner.checks_allowed.load(Ordering::Relaxed)
    }

    /// Get the total number of refused checks.
    pub fn checks_limited(&self) -> u64 {
        self.inner.checks_limited.load(Ordering::Relaxed)
    }

    /// Get the number of resets that cleared an existing key.
    pub fn keys_reset(&self) -> u64 {
        self.inner.keys_reset.load(Ordering::Relaxed)
    }

    /// Get the number of keys dropped by pruning.
    pub fn keys_pruned(&self) -> u64 {
        self.inner.keys_pruned.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            checks_allowed: self.checks_allowed(),
            checks_limited: self.checks_limited(),
            keys_reset: self.keys_reset(),
            keys_pruned: self.keys_pruned(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.checks_allowed.store(0, Ordering::Relaxed);
        self.inner.checks_limited.store(0, Ordering::Relaxed);
        self.inner.keys_reset.store(0, Ordering::Relaxed);
        self.inner.keys_pruned.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub checks_allowed: u64,
    pub checks_limited: u64,
    pub keys_reset: u64,
    pub keys_pruned: u64,
}

impl MetricsSnapshot {
    /// Fraction of checks that were refused (0.0 to 1.0).
    ///
    /// Returns 0.0 if no checks have been made.
    pub fn limit_rate(&self) -> f64 {
        let total = self.total_checks();
        if total == 0 {
            0.0
        } else {
            self.checks_limited as f64 / total as f64
        }
    }

    /// Get the total number of checks (allowed + limited).
    pub fn total_checks(&self) -> u64 {
        self.checks_allowed.saturating_add(self.checks_limited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initial_state() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot {
            checks_allowed: 0,
            checks_limited: 0,
            keys_reset: 0,
            keys_pruned: 0,
        });
    }

    #[test]
    fn test_snapshot() {
        let metrics = Metrics::new();
        metrics.record_allowed();
        metrics.record_allowed();
        metrics.record_limited();
        metrics.record_reset();
        metrics.record_pruned(4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.checks_allowed, 2);
        assert_eq!(snapshot.checks_limited, 1);
        assert_eq!(snapshot.keys_reset, 1);
        assert_eq!(snapshot.keys_pruned, 4);
        assert_eq!(snapshot.total_checks(), 3);
    }

    #[test]
    fn test_limit_rate() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot().limit_rate(), 0.0);

        metrics.record_allowed();
        assert_eq!(metrics.snapshot().limit_rate(), 0.0);

        metrics.record_limited();
        assert!((metrics.snapshot().limit_rate() - 0.5).abs() < f64::EPSILON);

        metrics.record_limited();
        metrics.record_limited();
        assert!((metrics.snapshot().limit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let metrics = Metrics::new();
        metrics.record_allowed();
        metrics.record_limited();
        metrics.record_reset();
        metrics.record_pruned(2);

        metrics.reset();
        assert_eq!(metrics.snapshot().total_checks(), 0);
        assert_eq!(metrics.keys_reset(), 0);
        assert_eq!(metrics.keys_pruned(), 0);
    }

    #[test]
    fn test_metrics_clone_shares_counters() {
        let metrics1 = Metrics::new();
        metrics1.record_allowed();

        let metrics2 = metrics1.clone();
        metrics2.record_allowed();

        assert_eq!(metrics1.checks_allowed(), 2);
        assert_eq!(metrics2.checks_allowed(), 2);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::thread;

        let metrics = Metrics::new();
        let mut handles = vec![];

        for _ in 0..10 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.record_allowed();
                    m.record_limited();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.checks_allowed(), 1000);
        assert_eq!(metrics.checks_limited(), 1000);
    }
}
