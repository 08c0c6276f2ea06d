use super::{NotificationSink, SinkError};
use crate::bus::{Event, PublishError, Publisher};
use crate::model::Notification;

/// Event type of notifications published by [`QueueSink`].
pub const NOTIFICATION_REQUESTED: &str = "notification.requested";

/// A sink that hands notifications to a downstream mailer over the bus.
///
/// Each notification becomes one `notification.requested` event with the
/// notification as its JSON payload.
pub struct QueueSink<P> {
    publisher: P,
}

impl<P: Publisher> QueueSink<P> {
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }
}

impl<P: Publisher> NotificationSink for QueueSink<P> {
    fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        let event = &notification.event;
        let id = format!(
            "notify:{}:{}",
            event.device_model,
            event.timestamp.timestamp_millis()
        );

        let message = Event::json(id, NOTIFICATION_REQUESTED, notification)
            .map_err(|e| SinkError::Rejected(e.to_string()))?;

        self.publisher.publish(message).map_err(|e| match e {
            PublishError::Rejected(msg) | PublishError::SerializationFailed(msg) => {
                SinkError::Rejected(msg)
            }
            other => SinkError::Unavailable(other.to_string()),
        })
    }
}
