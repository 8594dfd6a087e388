//! Builder wiring a `RateLimiter` to its default adapters.

use crate::application::{
    limiter::RateLimiter,
    metrics::Metrics,
    ports::Clock,
    registry::{WindowRegistry, WindowTable},
};
use crate::domain::{
    operation::{OperationKind, RateLimitKey},
    window::{SlidingWindow, WindowConfig, WindowConfigError},
};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::LimitsConfig;
use crate::infrastructure::storage::ShardedStorage;
use std::fmt;
use std::sync::Arc;

/// Storage used by limiters created through the builder.
pub type SharedWindowStorage = Arc<ShardedStorage<RateLimitKey, SlidingWindow>>;

/// A rate limiter backed by the default sharded in-memory storage.
pub type DefaultRateLimiter = RateLimiter<SharedWindowStorage>;

/// Error returned when building a `RateLimiter` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A configured window is invalid
    InvalidWindow {
        /// Operation the window was configured for (`"default"` for the fallback)
        operation: String,
        /// What was wrong with it
        source: WindowConfigError,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidWindow { operation, source } => {
                write!(f, "invalid window for operation '{}': {}", operation, source)
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::InvalidWindow { source, .. } => Some(source),
        }
    }
}

/// Builder for constructing a `RateLimiter`.
///
/// Starts from the built-in limits (checkout 3/60s, auth 5/300s, api 10/60s)
/// with the api limit as the fallback for custom operations.
#[derive(Debug)]
pub struct RateLimiterBuilder {
    windows: Vec<(OperationKind, WindowConfig)>,
    default_window: Option<WindowConfig>,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<Metrics>,
}

impl RateLimiterBuilder {
    fn new() -> Self {
        Self {
            windows: Vec::new(),
            default_window: None,
            clock: None,
            metrics: None,
        }
    }

    /// Start from a deserialized limits section.
    pub fn from_config(config: &LimitsConfig) -> Self {
        let mut builder = Self::new();
        for (name, window) in &config.operations {
            builder = builder.with_window(OperationKind::from_name(name), *window);
        }
        if let Some(default_window) = config.default_window {
            builder = builder.with_default_window(default_window);
        }
        builder
    }

    /// Set or override the window for one operation kind.
    ///
    /// The window will be validated when `build()` is called.
    pub fn with_window(mut self, operation: OperationKind, window: WindowConfig) -> Self {
        self.windows.push((operation, window));
        self
    }

    /// Set the window used by operations without an explicit one.
    pub fn with_default_window(mut self, window: WindowConfig) -> Self {
        self.default_window = Some(window);
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share a metrics tracker with other components.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the limiter.
    ///
    /// # Errors
    /// Returns `BuildError` if any configured window is invalid.
    pub fn build(self) -> Result<DefaultRateLimiter, BuildError> {
        let mut table = WindowTable::builtin();

        for (operation, window) in self.windows {
            window.validate().map_err(|source| BuildError::InvalidWindow {
                operation: operation.to_string(),
                source,
            })?;
            table.insert(operation, window);
        }

        if let Some(window) = self.default_window {
            window.validate().map_err(|source| BuildError::InvalidWindow {
                operation: "default".to_string(),
                source,
            })?;
            table.set_default(window);
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let storage: SharedWindowStorage = Arc::new(ShardedStorage::new());
        let registry = WindowRegistry::new(storage, clock, table);

        Ok(RateLimiter::new(registry, self.metrics.unwrap_or_default()))
    }
}

impl RateLimiter<SharedWindowStorage> {
    /// Create a builder for configuring the limiter.
    pub fn builder() -> RateLimiterBuilder {
        RateLimiterBuilder::new()
    }
}
