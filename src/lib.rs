//! # client-governance
//!
//! Client-side request governance utilities:
//!
//! - **Sliding-window rate limiting** per `(operation, caller)` key, with
//!   per-operation limits and whole-second retry hints.
//! - **Versioned cookie consent** persisted through a key-value port, with
//!   synchronous change observers.
//! - **A network-first offline cache worker** that precaches an app shell,
//!   purges old cache generations, falls back to cache when offline, and
//!   turns push messages into notifications.
//!
//! ## Quick Start
//!
//! ```rust
//! use client_governance::{OperationKind, RateLimitKey, RateLimiter, WindowConfig};
//! use std::time::Duration;
//!
//! let limiter = RateLimiter::builder()
//!     .with_window(
//!         OperationKind::custom("export"),
//!         WindowConfig::new(2, Duration::from_secs(30)).unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let key = RateLimitKey::new(OperationKind::custom("export"), "tenant-7");
//! assert!(limiter.check(&key).is_allowed());
//! assert!(limiter.check(&key).is_allowed());
//!
//! let refused = limiter.check(&key);
//! assert_eq!(refused.retry_after(), Some(Duration::from_secs(30)));
//! ```
//!
//! ## Built-in limits
//!
//! | Operation  | Attempts | Window |
//! |------------|----------|--------|
//! | `checkout` | 3        | 60 s   |
//! | `auth`     | 5        | 300 s  |
//! | `api`      | 10       | 60 s   |
//!
//! Operations without a configured window use the `api` limit unless a
//! different default is set with `with_default_window`.
//!
//! ## Consent
//!
//! ```rust
//! use client_governance::{ConsentCategory, ConsentConfig, ConsentStore, MemoryKeyValueStore, SystemClock};
//! use std::sync::Arc;
//!
//! let consent = ConsentStore::new(
//!     MemoryKeyValueStore::new(),
//!     Arc::new(SystemClock::new()),
//!     ConsentConfig::default(),
//! );
//! consent.subscribe(|record| println!("analytics allowed: {}", record.analytics));
//!
//! consent.reject_all().unwrap();
//! assert!(consent.is_granted(ConsentCategory::Necessary));
//! assert!(!consent.is_granted(ConsentCategory::Analytics));
//! ```
//!
//! Records saved under another version load as [`Consent::StaleVersion`]
//! and the user is asked again.
//!
//! ## Configuration
//!
//! Everything can be loaded from one JSON document with
//! [`GovernanceConfig::from_path`]; see [`infrastructure::config`].
//!
//! ## Logging
//!
//! All components log through `tracing`. The crate never installs a
//! subscriber.

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

#[cfg(any(test, feature = "test-helpers"))]
pub use infrastructure::mocks;

// Re-export commonly used types for convenience
pub use domain::{
    consent::{Consent, ConsentCategory, ConsentChoices, ConsentRecord, CONSENT_VERSION},
    fetch::{CacheKey, Method, Request, RequestMode, Response},
    operation::{OperationKind, RateLimitKey},
    push::{ClickAction, Notification, NotificationAction, PushPayload},
    window::{SlidingWindow, WindowConfig, WindowConfigError, WindowDecision},
};

pub use application::{
    consent::{ConsentConfig, ConsentStore},
    limiter::{RateLimitDecision, RateLimiter},
    metrics::{Metrics, MetricsSnapshot},
    observers::Subscription,
    ports::{
        CacheStorage, ClientWindow, ClientWindows, Clock, FetchError, Fetcher, KeyValueStore,
        NotificationSink, Storage, StorageError,
    },
    pruner::{Pruner, PrunerConfig, PrunerConfigError},
    push::{PushDefaults, PushHandler},
    registry::{WindowRegistry, WindowTable},
    worker::{OfflineWorker, WorkerConfig, WorkerConfigError, WorkerError, WorkerState},
};

#[cfg(feature = "async")]
pub use application::pruner::PrunerHandle;

pub use infrastructure::{
    builder::{BuildError, DefaultRateLimiter, RateLimiterBuilder, SharedWindowStorage},
    cache_storage::MemoryCacheStorage,
    clock::SystemClock,
    config::{ConfigError, GovernanceConfig, LimitsConfig},
    kv::{FileKeyValueStore, MemoryKeyValueStore},
    notifications::TracingNotificationSink,
    storage::ShardedStorage,
};

#[cfg(feature = "http")]
pub use infrastructure::http::ReqwestFetcher;
