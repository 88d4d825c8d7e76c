//! User-visible feedback sink.

use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Fans notifications out to any number of subscribers (toasts, status lines, tests).
pub struct BroadcastNotificationSink {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotificationSink {
    /// Keeps at most `capacity` undelivered notifications per subscriber (at least one).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotificationSink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl NotificationSink for BroadcastNotificationSink {
    fn notify(&self, message: &str, severity: Severity) {
        let _ = self.tx.send(Notification {
            message: message.to_string(),
            severity,
        });
    }
}
