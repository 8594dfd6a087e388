//! Push payloads and the notifications built from them.

use serde::Deserialize;

/// Action identifier for opening the notification target.
pub const ACTION_VIEW: &str = "view";
/// Action identifier for dismissing the notification.
pub const ACTION_DISMISS: &str = "dismiss";

/// Optional JSON body of a push message. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PushPayload {
    /// Parse a raw push body.
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

/// Button shown on a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

impl NotificationAction {
    pub fn new(action: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            title: title.into(),
        }
    }
}

/// A notification ready to be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Where "view" navigates to
    pub url: String,
    pub actions: Vec<NotificationAction>,
}

/// What the user did with a displayed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Clicked the notification body without choosing an action
    Body,
    /// Chose "view"
    View,
    /// Chose "dismiss"
    Dismiss,
    /// Chose an action this handler does not know
    Unknown,
}

impl ClickAction {
    /// Map the action identifier reported by the host.
    pub fn from_action(action: Option<&str>) -> Self {
        match action {
            None | Some("") => ClickAction::Body,
            Some(ACTION_VIEW) => ClickAction::View,
            Some(ACTION_DISMISS) => ClickAction::Dismiss,
            Some(_) => ClickAction::Unknown,
        }
    }

    /// Whether this click should bring the target URL to the front.
    pub fn opens_target(&self) -> bool {
        matches!(self, ClickAction::Body | ClickAction::View)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_fields_optional() {
        let payload = PushPayload::from_slice(br#"{"title":"Run finished"}"#).unwrap();
        assert_eq!(payload.title.as_deref(), Some("Run finished"));
        assert_eq!(payload.body, None);
        assert_eq!(payload.url, None);

        let empty = PushPayload::from_slice(b"{}").unwrap();
        assert_eq!(empty, PushPayload::default());
    }

    #[test]
    fn test_payload_rejects_garbage() {
        assert!(PushPayload::from_slice(b"plain text").is_err());
    }

    #[test]
    fn test_click_actions() {
        assert_eq!(ClickAction::from_action(None), ClickAction::Body);
        assert_eq!(ClickAction::from_action(Some("")), ClickAction::Body);
        assert_eq!(ClickAction::from_action(Some("view")), ClickAction::View);
        assert_eq!(ClickAction::from_action(Some("dismiss")), ClickAction::Dismiss);
        assert_eq!(ClickAction::from_action(Some("snooze")), ClickAction::Unknown);

        assert!(ClickAction::View.opens_target());
        assert!(ClickAction::Body.opens_target());
        assert!(!ClickAction::Dismiss.opens_target());
        assert!(!ClickAction::Unknown.opens_target());
    }
}
