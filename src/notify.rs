use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Sink for user-facing toasts/banners. Fire-and-forget: callers never
/// consume a return value, so a sink must not fail.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, kind: NotificationKind, title: &str, message: &str);
}

/// Default sink: structured log events at the matching level. The real
/// toast UI subscribes outside this crate.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    surface_info: bool,
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self { surface_info: true }
    }
}

impl LogNotifier {
    pub fn from_settings(settings: &crate::models::AppSettings) -> Self {
        Self {
            surface_info: settings.surface_info_notifications,
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        match kind {
            NotificationKind::Error => {
                tracing::error!(kind = kind.as_str(), title, message, "notification")
            }
            NotificationKind::Warning => {
                tracing::warn!(kind = kind.as_str(), title, message, "notification")
            }
            NotificationKind::Success | NotificationKind::Info => {
                if self.surface_info {
                    tracing::info!(kind = kind.as_str(), title, message, "notification")
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// Captures every notification for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    captured: Mutex<Vec<CapturedNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured(&self) -> Vec<CapturedNotification> {
        self.captured.lock().map(|entries| entries.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        if let Ok(mut entries) = self.captured.lock() {
            entries.push(CapturedNotification {
                kind,
                title: title.to_string(),
                message: message.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NotificationKind, Notifier, RecordingNotifier};

    #[tokio::test]
    async fn recording_notifier_captures_in_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(NotificationKind::Success, "Saved", "Client created").await;
        notifier.notify(NotificationKind::Error, "Save failed", "tasks/t1: timeout").await;
        let captured = notifier.captured();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].kind, NotificationKind::Success);
        assert_eq!(captured[1].title, "Save failed");
    }
}
