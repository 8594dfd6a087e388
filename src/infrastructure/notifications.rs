//! Notification sink that writes to the tracing pipeline.
//!
//! Useful for headless hosts with no notification surface.

use crate::application::ports::NotificationSink;
use crate::domain::push::Notification;
use async_trait::async_trait;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl TracingNotificationSink {
    /// Create a sink that logs at `info`.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn show(&self, notification: &Notification) {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            url = %notification.url,
            actions = notification.actions.len(),
            "notification shown"
        );
    }

    async fn close(&self, notification: &Notification) {
        tracing::debug!(title = %notification.title, "notification closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::MockCaptureLayer;
    use tracing_subscriber::layer::SubscriberExt;

    #[tokio::test]
    async fn test_logs_shown_notification() {
        let capture = MockCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let notification = Notification {
            title: "Run finished".to_string(),
            body: "All steps passed".to_string(),
            icon: "/icon-192x192.png".to_string(),
            badge: "/icon-72x72.png".to_string(),
            url: "/runs/7".to_string(),
            actions: Vec::new(),
        };
        TracingNotificationSink::new().show(&notification).await;

        let events = capture.with_message("notification shown");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field("url"), Some("/runs/7"));
    }
}
