//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - Storage implementations (sharded maps, key-value stores, response caches)
//! - Network and notification adapters for the cache worker
//! - Builders and configuration loading

pub mod builder;
pub mod cache_storage;
pub mod clock;
pub mod config;
pub mod kv;
pub mod notifications;
pub mod storage;

#[cfg(feature = "http")]
pub mod http;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// client-governance = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
