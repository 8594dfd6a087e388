//! Mock clock for testing.

use crate::application::ports::Clock;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Mock clock for testing.
///
/// Allows tests to control time progression explicitly, enabling deterministic
/// testing of sliding windows and consent timestamps. Monotonic and
/// wall-clock time advance together.
///
/// # Examples
///
/// ```
/// use client_governance::infrastructure::mocks::MockClock;
/// use client_governance::application::ports::Clock;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let clock = MockClock::new(start);
///
/// // Time starts at the specified instant
/// assert_eq!(clock.now(), start);
///
/// // Advance time explicitly
/// let wall = clock.utc_now();
/// clock.advance(Duration::from_secs(10));
/// assert_eq!(clock.now(), start + Duration::from_secs(10));
/// assert_eq!(clock.utc_now(), wall + chrono::Duration::seconds(10));
/// ```
///
/// # Thread Safety
///
/// `MockClock` is thread-safe and can be cloned to share across threads.
/// All clones share the same underlying time value, so advancing time in
/// one clone affects all clones.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<(Instant, DateTime<Utc>)>>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    ///
    /// Wall-clock time starts at 2024-01-01T00:00:00Z.
    pub fn new(start: Instant) -> Self {
        Self::with_wall_clock(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    /// Create a mock clock with explicit monotonic and wall-clock starts.
    pub fn with_wall_clock(start: Instant, wall: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new((start, wall))),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self
            .current
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        time.0 += duration;
        time.1 += chrono::Duration::from_std(duration).expect("duration out of range for chrono");
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.current
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
            .0
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.current
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
            .1
    }
}
