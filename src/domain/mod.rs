//! Domain layer - pure types and rules with no I/O.
//!
//! This layer contains the core concepts of the governance utilities:
//! - Sliding-window accounting and rate-limit keys
//! - Consent records and their version classification
//! - Request, response and cache-key types for the offline worker
//! - Push payloads and notifications
//!
//! All types in this layer are pure and easily testable.

pub mod consent;
pub mod fetch;
pub mod operation;
pub mod push;
pub mod window;
