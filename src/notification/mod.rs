//! Desktop notifications for incoming chat messages

use std::str::FromStr;

use tracing::{debug, warn};

/// Notification backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationBackend {
    /// No notifications
    None,
    /// System notifications via notify-rust
    #[default]
    System,
}

const PREVIEW_MAX_CHARS: usize = 120;

impl NotificationBackend {
    /// Parse backend from settings value (case-insensitive)
    pub fn from_settings_value(s: &str) -> Option<Self> {
        Self::from_str(s).ok()
    }

    /// Convert backend to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::System => "system",
        }
    }

    /// Toggle between system notifications and none
    pub fn toggle(&self) -> Self {
        match self {
            Self::System => Self::None,
            Self::None => Self::System,
        }
    }
}

impl FromStr for NotificationBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "system" => Ok(Self::System),
            _ => Err(()),
        }
    }
}

/// Send a notification for a chat message that arrived while the
/// conversation was not open.
pub fn notify_incoming_message(sender: &str, body: &str, backend: NotificationBackend) {
    if backend == NotificationBackend::None {
        debug!(sender = %sender, "notification skipped (backend is none)");
        return;
    }

    let message = format!("{}: {}", sender, preview(body));
    send_system_notification(sender, &message);
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= PREVIEW_MAX_CHARS {
        return trimmed.to_string();
    }
    let truncated: String = trimmed.chars().take(PREVIEW_MAX_CHARS).collect();
    format!("{truncated}…")
}

fn send_system_notification(sender: &str, message: &str) {
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    {
        debug!(sender = %sender, message = %message, "sending system notification");

        let notification_result = notify_rust::Notification::new()
            .summary("Teamboard")
            .body(message)
            .icon("dialog-information")
            .show();

        match notification_result {
            Ok(_) => {
                debug!(sender = %sender, "system notification sent successfully");
            }
            Err(err) => {
                warn!(error = %err, "failed to send system notification");
            }
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        debug!(
            sender = %sender,
            message = %message,
            "system notifications not supported on this OS"
        );
    }
}
