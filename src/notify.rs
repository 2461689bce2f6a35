//! Notification sinks. Fire-and-forget; failures are never reported back.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::info;

/// Side-effect sink for short user-facing messages.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str);
}

/// Sink that writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, message: &str) {
        info!(target: "persona::notify", message = %message, "Notification");
    }
}

/// A notification captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// Sink that keeps every notification in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().iter().map(|n| n.message.clone()).collect()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.sent.lock())
    }
}

impl NotificationSink for MemoryNotifier {
    fn notify(&self, message: &str) {
        self.sent.lock().push(Notification {
            message: message.to_string(),
            sent_at: Utc::now(),
        });
    }
}
