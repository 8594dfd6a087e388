//! Sliding-window accounting for rate-limited operations.
//!
//! A window remembers the instants of recently admitted attempts and
//! decides whether one more attempt fits inside the trailing time span.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Error returned when a window configuration is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowConfigError {
    /// `max_attempts` must be greater than zero
    ZeroMaxAttempts,
    /// The window duration must be greater than zero
    ZeroWindow,
}

impl fmt::Display for WindowConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowConfigError::ZeroMaxAttempts => write!(f, "max_attempts must be greater than 0"),
            WindowConfigError::ZeroWindow => write!(f, "window must be greater than 0"),
        }
    }
}

impl std::error::Error for WindowConfigError {}

/// Limit for one operation type: at most `max_attempts` within `window_ms`.
///
/// The serialized form uses milliseconds so configuration files read the
/// same way the limits are usually written down (`3 per 60000ms`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    max_attempts: u32,
    window_ms: u64,
}

impl WindowConfig {
    /// Create a validated window configuration.
    ///
    /// # Errors
    /// Returns an error if `max_attempts` is zero or `window` rounds down to
    /// zero milliseconds.
    ///
    /// # Example
    /// ```
    /// use client_governance::WindowConfig;
    /// use std::time::Duration;
    ///
    /// let config = WindowConfig::new(3, Duration::from_secs(60)).unwrap();
    /// assert_eq!(config.max_attempts(), 3);
    /// assert!(WindowConfig::new(0, Duration::from_secs(60)).is_err());
    /// ```
    pub fn new(max_attempts: u32, window: Duration) -> Result<Self, WindowConfigError> {
        let config = Self {
            max_attempts,
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checkout initiation: 3 attempts per minute.
    pub const fn checkout() -> Self {
        Self {
            max_attempts: 3,
            window_ms: 60_000,
        }
    }

    /// Authentication: 5 attempts per 5 minutes.
    pub const fn auth() -> Self {
        Self {
            max_attempts: 5,
            window_ms: 300_000,
        }
    }

    /// Generic API calls: 10 per minute.
    pub const fn api() -> Self {
        Self {
            max_attempts: 10,
            window_ms: 60_000,
        }
    }

    /// Check the invariants. Deserialized configs bypass `new`, so builders
    /// call this before accepting one.
    pub fn validate(&self) -> Result<(), WindowConfigError> {
        if self.max_attempts == 0 {
            return Err(WindowConfigError::ZeroMaxAttempts);
        }
        if self.window_ms == 0 {
            return Err(WindowConfigError::ZeroWindow);
        }
        Ok(())
    }

    /// Maximum attempts admitted per window.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Length of the trailing window.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Outcome of registering one attempt against a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
    /// The attempt fits and has been recorded
    Admitted,
    /// The window is full; the oldest attempt ages out after `retry_after`
    Full {
        /// Time until the oldest recorded attempt leaves the window
        retry_after: Duration,
    },
}

/// Sliding window of admitted attempt instants.
///
/// The window is half-open: an attempt recorded exactly `window` ago has
/// already expired. That keeps `retry_after` strictly positive whenever the
/// window is full.
///
/// # Example
/// ```
/// use client_governance::domain::window::{SlidingWindow, WindowDecision};
/// use client_governance::WindowConfig;
/// use std::time::{Duration, Instant};
///
/// let mut window = SlidingWindow::new(WindowConfig::new(2, Duration::from_secs(60)).unwrap());
/// let now = Instant::now();
///
/// assert_eq!(window.register(now), WindowDecision::Admitted);
/// assert_eq!(window.register(now), WindowDecision::Admitted);
/// assert!(matches!(window.register(now), WindowDecision::Full { .. }));
///
/// // Once the window has slid past both attempts, new ones are admitted.
/// assert_eq!(window.register(now + Duration::from_secs(60)), WindowDecision::Admitted);
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    config: WindowConfig,
    attempts: VecDeque<Instant>,
}

impl SlidingWindow {
    /// Create an empty window.
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            attempts: VecDeque::with_capacity(config.max_attempts as usize),
        }
    }

    /// Drop attempts that have aged out of the window.
    fn expire(&mut self, now: Instant) {
        let window = self.config.window();
        while let Some(&oldest) = self.attempts.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.attempts.pop_front();
            } else {
                break;
            }
        }
    }

    /// Register an attempt at `now`, recording it only if it fits.
    pub fn register(&mut self, now: Instant) -> WindowDecision {
        self.expire(now);

        if self.attempts.len() < self.config.max_attempts as usize {
            self.attempts.push_back(now);
            return WindowDecision::Admitted;
        }

        // Non-empty here because max_attempts > 0.
        let retry_after = self
            .attempts
            .front()
            .map(|&oldest| (oldest + self.config.window()).saturating_duration_since(now))
            .unwrap_or_default();
        WindowDecision::Full { retry_after }
    }

    /// Attempts still available at `now`, without recording anything.
    pub fn remaining(&mut self, now: Instant) -> u32 {
        self.expire(now);
        let used = u32::try_from(self.attempts.len()).unwrap_or(u32::MAX);
        self.config.max_attempts.saturating_sub(used)
    }

    /// True once every recorded attempt has aged out.
    pub fn is_expired(&mut self, now: Instant) -> bool {
        self.expire(now);
        self.attempts.is_empty()
    }

    /// Number of attempts currently recorded (including not-yet-pruned ones).
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// Check if no attempts are recorded.
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Forget all recorded attempts.
    pub fn clear(&mut self) {
        self.attempts.clear();
    }

    /// The configuration this window enforces.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }
}

impl WindowDecision {
    /// Check if the attempt was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, WindowDecision::Admitted)
    }
}
