//! Mock implementations for testing.
//!
//! Test doubles for the infrastructure adapters, so application logic can be
//! driven deterministically.

pub mod clock;
pub mod fetcher;
pub mod layer;
pub mod notifications;

pub use clock::MockClock;
pub use fetcher::MockFetcher;
pub use layer::{CapturedEvent, MockCaptureLayer};
pub use notifications::{MockClientWindows, RecordingNotificationSink, WindowEvent};
