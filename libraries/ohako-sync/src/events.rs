//! User-facing notifications
//!
//! Transient messages pushed by the coordinator after a mutation completes.
//! Front ends drain the receiving half of the channel and render them; the
//! core never waits on a reader.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Failure,
}

/// A transient message for the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Failure,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.level == NotificationLevel::Failure
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Failure => "✗",
        };
        write!(f, "{} {}", marker, self.message)
    }
}

/// Sending half used by the coordinator
pub type NotificationSender = mpsc::UnboundedSender<Notification>;

/// Receiving half handed to the front end
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Create a notification channel
pub fn channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}

/// Drain everything currently queued without waiting
pub fn drain(rx: &mut NotificationReceiver) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        out.push(notification);
    }
    out
}
