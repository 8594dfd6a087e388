//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages runtime behavior:
//! - Window registry and rate limiter (admission decisions)
//! - Pruner (periodic cleanup of expired windows)
//! - Consent store and its observers
//! - Offline cache worker and push handling
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod consent;
pub mod limiter;
pub mod metrics;
pub mod observers;
pub mod ports;
pub mod pruner;
pub mod push;
pub mod registry;
pub mod worker;
