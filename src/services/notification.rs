//! Notification service implementation
//!
//! Transient notifications ("toasts") raised by admin actions, logins and
//! manual syncs. They are broadcast to whichever front end is subscribed and
//! also written to the log, so nothing is lost when no one is listening.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// How a toast is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
    pub created_at: DateTime<Utc>,
}

/// Notification statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total_sent: u64,
    pub total_errors: u64,
}

/// Broadcasts toasts to subscribers
#[derive(Clone, Debug)]
pub struct NotificationService {
    sender: broadcast::Sender<Notification>,
    sent: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
}

impl NotificationService {
    /// Create a new NotificationService keeping up to `capacity` unread toasts per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            sent: Arc::new(AtomicU64::new(0)),
            errors: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) {
        self.publish(title.into(), description.into(), Variant::Default);
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.publish(title.into(), description.into(), Variant::Destructive);
    }

    fn publish(&self, title: String, description: String, variant: Variant) {
        match variant {
            Variant::Default => info!(title = %title, description = %description, "Notification"),
            Variant::Destructive => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                warn!(title = %title, description = %description, "Error notification");
            }
        }
        self.sent.fetch_add(1, Ordering::Relaxed);

        let notification = Notification {
            title,
            description,
            variant,
            created_at: Utc::now(),
        };
        // No subscribers is fine; the toast was logged above
        let _ = self.sender.send(notification);
    }

    pub fn stats(&self) -> NotificationStats {
        NotificationStats {
            total_sent: self.sent.load(Ordering::Relaxed),
            total_errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new(64)
    }
}
