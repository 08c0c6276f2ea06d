//! Notification sinks and the one-way dispatcher in front of them.
//!
//! ```text
//!  AvailabilityMatcher ──send()──▶ Dispatcher ──deliver()──▶ NotificationSink
//!                       (no result)    │                       (LogSink, QueueSink, ...)
//!                                      └─ inline, or on a background worker thread
//! ```
//!
//! Delivery is at-least-once at best: the matcher never waits for, retries,
//! or observes the outcome of a delivery. Sink failures are logged by the
//! dispatcher and dropped.

mod dispatcher;
mod log;
#[cfg(feature = "bus")]
mod queue;

use std::fmt;
use std::sync::Arc;

use crate::model::Notification;

pub use dispatcher::{DispatchStats, Dispatcher, DispatcherHandle};
pub use log::LogSink;
#[cfg(feature = "bus")]
pub use queue::QueueSink;

/// A delivery channel for notifications (email, push, a message bus, ...).
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), SinkError>;
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        (**self).deliver(notification)
    }
}

/// Error type for notification delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The delivery channel could not be reached.
    Unavailable(String),
    /// The delivery channel refused the notification.
    Rejected(String),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Unavailable(msg) => write!(f, "notification sink unavailable: {}", msg),
            SinkError::Rejected(msg) => write!(f, "notification rejected: {}", msg),
        }
    }
}

impl std::error::Error for SinkError {}
