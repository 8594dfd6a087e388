//! Recording doubles for the notification and window ports.

use crate::application::ports::{ClientWindow, ClientWindows, NotificationSink};
use crate::domain::push::Notification;
use async_trait::async_trait;
use std::sync::Mutex;

/// Sink that remembers what was shown and closed.
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    shown: Mutex<Vec<Notification>>,
    closed: Mutex<Vec<Notification>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().expect("sink mutex poisoned").clone()
    }

    pub fn closed(&self) -> Vec<Notification> {
        self.closed.lock().expect("sink mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn show(&self, notification: &Notification) {
        self.shown
            .lock()
            .expect("sink mutex poisoned")
            .push(notification.clone());
    }

    async fn close(&self, notification: &Notification) {
        self.closed
            .lock()
            .expect("sink mutex poisoned")
            .push(notification.clone());
    }
}

/// What happened to the client windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    Focused(String),
    Opened(String),
}

/// In-memory set of client windows.
#[derive(Debug, Default)]
pub struct MockClientWindows {
    windows: Mutex<Vec<ClientWindow>>,
    events: Mutex<Vec<WindowEvent>>,
}

impl MockClientWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_window(&self, window: ClientWindow) {
        self.windows.lock().expect("windows mutex poisoned").push(window);
    }

    /// Focus and open calls, in order.
    pub fn events(&self) -> Vec<WindowEvent> {
        self.events.lock().expect("windows mutex poisoned").clone()
    }
}

#[async_trait]
impl ClientWindows for MockClientWindows {
    async fn windows(&self) -> Vec<ClientWindow> {
        self.windows.lock().expect("windows mutex poisoned").clone()
    }

    async fn focus(&self, id: &str) -> bool {
        let exists = self
            .windows
            .lock()
            .expect("windows mutex poisoned")
            .iter()
            .any(|w| w.id == id);
        if exists {
            self.events
                .lock()
                .expect("windows mutex poisoned")
                .push(WindowEvent::Focused(id.to_string()));
        }
        exists
    }

    async fn open(&self, url: &str) {
        let mut windows = self.windows.lock().expect("windows mutex poisoned");
        let id = format!("window-{}", windows.len() + 1);
        windows.push(ClientWindow {
            id,
            url: url.to_string(),
        });
        self.events
            .lock()
            .expect("windows mutex poisoned")
            .push(WindowEvent::Opened(url.to_string()));
    }
}
