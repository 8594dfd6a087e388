//! Push message and notification click handling.

use crate::application::ports::{ClientWindows, NotificationSink};
use crate::domain::push::{
    ClickAction, Notification, NotificationAction, PushPayload, ACTION_DISMISS, ACTION_VIEW,
};
use std::sync::Arc;

/// Values used when a push payload omits a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushDefaults {
    /// Notification title
    pub title: String,
    /// Notification body text
    pub body: String,
    /// URL opened when the notification is clicked
    pub url: String,
    /// Icon image URL
    pub icon: String,
    /// Badge image URL
    pub badge: String,
}

impl Default for PushDefaults {
    fn default() -> Self {
        Self {
            title: "AutoFlow".to_string(),
            body: "You have a new notification".to_string(),
            url: "/".to_string(),
            icon: "/icon-192x192.png".to_string(),
            badge: "/icon-72x72.png".to_string(),
        }
    }
}

/// Turns push messages into notifications and routes clicks on them.
#[derive(Debug, Clone)]
pub struct PushHandler {
    sink: Arc<dyn NotificationSink>,
    windows: Arc<dyn ClientWindows>,
    defaults: PushDefaults,
}

impl PushHandler {
    /// Create a handler using the built-in defaults.
    pub fn new(sink: Arc<dyn NotificationSink>, windows: Arc<dyn ClientWindows>) -> Self {
        Self::with_defaults(sink, windows, PushDefaults::default())
    }

    /// Create a handler with custom defaults.
    pub fn with_defaults(
        sink: Arc<dyn NotificationSink>,
        windows: Arc<dyn ClientWindows>,
        defaults: PushDefaults,
    ) -> Self {
        Self {
            sink,
            windows,
            defaults,
        }
    }

    /// Build the notification for a push message.
    ///
    /// A missing payload, invalid JSON and missing fields all fall back to
    /// the defaults.
    pub fn build_notification(&self, data: Option<&[u8]>) -> Notification {
        let payload = match data {
            None => PushPayload::default(),
            Some(bytes) => PushPayload::from_slice(bytes).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "invalid push payload, using defaults");
                PushPayload::default()
            }),
        };

        Notification {
            title: payload.title.unwrap_or_else(|| self.defaults.title.clone()),
            body: payload.body.unwrap_or_else(|| self.defaults.body.clone()),
            icon: self.defaults.icon.clone(),
            badge: self.defaults.badge.clone(),
            url: payload.url.unwrap_or_else(|| self.defaults.url.clone()),
            actions: vec![
                NotificationAction::new(ACTION_VIEW, "View"),
                NotificationAction::new(ACTION_DISMISS, "Dismiss"),
            ],
        }
    }

    /// Display a notification for a push message and return it.
    pub async fn handle_push(&self, data: Option<&[u8]>) -> Notification {
        let notification = self.build_notification(data);
        tracing::info!(title = %notification.title, url = %notification.url, "showing push notification");
        self.sink.show(&notification).await;
        notification
    }

    /// React to a click on a displayed notification.
    ///
    /// The notification is always closed. A view or body click then focuses
    /// a window already showing the target URL, or opens a new one.
    pub async fn handle_notification_click(
        &self,
        notification: &Notification,
        action: Option<&str>,
    ) -> ClickAction {
        let click = ClickAction::from_action(action);
        self.sink.close(notification).await;

        if !click.opens_target() {
            tracing::debug!(action = ?click, "notification closed");
            return click;
        }

        let existing = self
            .windows
            .windows()
            .await
            .into_iter()
            .find(|window| window.url == notification.url);

        if let Some(window) = existing {
            if self.windows.focus(&window.id).await {
                tracing::debug!(window = %window.id, url = %notification.url, "focused existing window");
                return click;
            }
        }

        tracing::debug!(url = %notification.url, "opening new window");
        self.windows.open(&notification.url).await;
        click
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ClientWindow;
    use crate::infrastructure::mocks::{MockClientWindows, RecordingNotificationSink, WindowEvent};

    fn handler() -> (PushHandler, Arc<RecordingNotificationSink>, Arc<MockClientWindows>) {
        let sink = Arc::new(RecordingNotificationSink::new());
        let windows = Arc::new(MockClientWindows::new());
        (PushHandler::new(sink.clone(), windows.clone()), sink, windows)
    }

    #[tokio::test]
    async fn test_push_with_payload() {
        let (handler, sink, _) = handler();
        let shown = handler
            .handle_push(Some(&br#"{"title":"Run failed","body":"Step 3 errored","url":"/runs/42"}"#[..]))
            .await;

        assert_eq!(shown.title, "Run failed");
        assert_eq!(shown.body, "Step 3 errored");
        assert_eq!(shown.url, "/runs/42");
        assert_eq!(shown.icon, "/icon-192x192.png");
        let actions: Vec<_> = shown.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, vec!["view", "dismiss"]);
        assert_eq!(sink.shown(), vec![shown]);
    }

    #[tokio::test]
    async fn test_push_defaults() {
        let (handler, _, _) = handler();
        let defaults = PushDefaults::default();

        for data in [None, Some(&b"not json"[..]), Some(&b"{}"[..])] {
            let shown = handler.handle_push(data).await;
            assert_eq!(shown.title, defaults.title);
            assert_eq!(shown.body, defaults.body);
            assert_eq!(shown.url, "/");
        }
    }

    #[tokio::test]
    async fn test_dismiss_only_closes() {
        let (handler, sink, windows) = handler();
        let notification = handler.build_notification(None);

        let click = handler.handle_notification_click(&notification, Some("dismiss")).await;
        assert_eq!(click, ClickAction::Dismiss);
        assert_eq!(sink.closed().len(), 1);
        assert!(windows.events().is_empty());
    }

    #[tokio::test]
    async fn test_view_focuses_existing_window() {
        let (handler, sink, windows) = handler();
        windows.add_window(ClientWindow {
            id: "w1".to_string(),
            url: "/runs/42".to_string(),
        });
        let notification = handler.build_notification(Some(&br#"{"url":"/runs/42"}"#[..]));

        handler.handle_notification_click(&notification, Some("view")).await;
        assert_eq!(sink.closed().len(), 1);
        assert_eq!(windows.events(), vec![WindowEvent::Focused("w1".to_string())]);
    }

    #[tokio::test]
    async fn test_body_click_opens_new_window() {
        let (handler, _, windows) = handler();
        windows.add_window(ClientWindow {
            id: "w1".to_string(),
            url: "/dashboard".to_string(),
        });
        let notification = handler.build_notification(Some(&br#"{"url":"/runs/42"}"#[..]));

        let click = handler.handle_notification_click(&notification, None).await;
        assert_eq!(click, ClickAction::Body);
        assert_eq!(windows.events(), vec![WindowEvent::Opened("/runs/42".to_string())]);
    }
}
