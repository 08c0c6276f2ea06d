use std::sync::{Arc, Mutex};

use super::{NotificationSink, SinkError};
use crate::model::Notification;

/// A sink that records "would notify" lines instead of sending mail.
///
/// Writes through `tracing` by default, or into a shared buffer for tests.
pub struct LogSink {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink {
    pub fn new() -> Self {
        LogSink { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogSink {
            buffer: Some(buffer),
        }
    }
}

impl NotificationSink for LogSink {
    fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        let event = &notification.event;
        match &self.buffer {
            Some(buffer) => {
                let line = format!(
                    "[NOTIFY] {} x{} -> {}",
                    event.device_model,
                    event.available_count,
                    notification.recipients.join(",")
                );
                buffer
                    .lock()
                    .map_err(|_| SinkError::Unavailable("log buffer poisoned".into()))?
                    .push(line);
            }
            None => tracing::info!(
                model = %event.device_model,
                available = event.available_count,
                emails = ?notification.recipients,
                correlation_timestamp = %event.timestamp.to_rfc3339(),
                "would notify subscribers"
            ),
        }
        Ok(())
    }
}
