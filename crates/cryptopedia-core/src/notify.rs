//! Toast-style notification queue.
//!
//! Written by the API gateway and the auth flows, drained by the front end.
//! Each notification expires on its own; the front end calls
//! [`NotificationQueue::prune`] on every tick.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// How long a toast stays visible.
const DEFAULT_TTL_SECS: i64 = 4;

/// Oldest entries are dropped past this size.
const MAX_QUEUED: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Anything that can surface a user-visible message.
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);

    fn error(&self, message: &str) {
        self.notify(Severity::Error, message);
    }

    fn success(&self, message: &str) {
        self.notify(Severity::Success, message);
    }
}

/// Shared notification queue. Clone is cheap and shares state.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    inner: Arc<Mutex<VecDeque<Notification>>>,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push_at(&self, severity: Severity, message: &str, now: DateTime<Utc>) {
        let mut queue = self.lock();
        if queue.len() >= MAX_QUEUED {
            queue.pop_front();
        }
        queue.push_back(Notification {
            severity,
            message: message.to_string(),
            created_at: now,
            expires_at: now + self.ttl,
        });
    }

    /// Drop expired notifications.
    pub fn prune(&self, now: DateTime<Utc>) {
        self.lock().retain(|n| !n.is_expired(now));
    }

    /// Notifications still visible at `now`, oldest first.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Notification> {
        self.lock()
            .iter()
            .filter(|n| !n.is_expired(now))
            .cloned()
            .collect()
    }

    /// Everything queued, expired or not.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, severity: Severity, message: &str) {
        debug!(?severity, message, "Notification queued");
        self.push_at(severity, message, Utc::now());
    }
}
