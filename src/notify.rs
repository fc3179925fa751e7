//! User-facing failure notifications
//!
//! The gateway never talks to a UI directly. Whoever constructs it hands over a
//! [`NotificationSink`], and every classified failure is pushed through it once.

use crate::{constants::NOTIFICATION_CHANNEL_CAPACITY, error::GatewayError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// How prominently a notification should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Transient condition the user can wait out
    Warning,
    /// The requested data could not be loaded
    Error,
}

/// A short message meant for the end user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Builds the notification for a failed operation
    ///
    /// `subject` names what was being loaded, e.g. `"chart data for bitcoin"`.
    pub fn for_failure(error: &GatewayError, subject: &str) -> Self {
        let message = match error {
            GatewayError::RateLimited => "Rate limit reached. Please wait a moment.".to_string(),
            GatewayError::Timeout => "Request timed out. Check your connection.".to_string(),
            GatewayError::NetworkUnavailable(_) => {
                "Network error. Check your internet connection.".to_string()
            }
            GatewayError::Upstream { .. } | GatewayError::Client(_) => {
                format!("Failed to load {subject}.")
            }
        };

        Self::new(error.severity(), message)
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.message)
    }
}

/// Receiver of user-facing notifications
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<F> NotificationSink for F
where
    F: Fn(Notification) + Send + Sync,
{
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// Sink that only writes notifications to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Warning => tracing::warn!(text = %notification.message, "User notification"),
            Severity::Error => tracing::error!(text = %notification.message, "User notification"),
        }
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: Notification) {}
}

/// Sink that fans notifications out to any number of subscribers
///
/// Sending with no live subscriber is not an error; the notification is dropped.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    pub fn new() -> Self {
        Self::with_capacity(NOTIFICATION_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::trace!("Notification dropped, no subscribers");
        }
    }
}
