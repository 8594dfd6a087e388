//! Tracing layer that records events, for asserting on log output.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing_subscriber::Layer;

/// Layer that captures every event it sees.
#[derive(Clone, Default)]
pub struct MockCaptureLayer {
    captured: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// One recorded event.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Every non-message field, formatted with `Debug` (or as-is for strings)
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Value of a field, if the event had it.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl MockCaptureLayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, Vec<CapturedEvent>> {
        self.captured
            .lock()
            .expect("MockCaptureLayer mutex poisoned")
    }

    /// All captured events, oldest first.
    pub fn get_captured(&self) -> Vec<CapturedEvent> {
        self.events().clone()
    }

    pub fn count(&self) -> usize {
        self.events().len()
    }

    /// Events whose message equals `message`.
    pub fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .iter()
            .filter(|e| e.message == message)
            .cloned()
            .collect()
    }

    /// Events recorded at exactly `level`.
    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.events().clear();
    }
}

impl std::fmt::Debug for MockCaptureLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCaptureLayer")
            .field("captured", &self.count())
            .finish()
    }
}

impl<S> Layer<S> for MockCaptureLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        self.events().push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: BTreeMap<String, String>,
}

impl tracing::field::Visit for FieldCollector {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let formatted = format!("{:?}", value);
        if field.name() == "message" {
            self.message = formatted;
        } else {
            self.fields.insert(field.name().to_string(), formatted);
        }
    }
}
