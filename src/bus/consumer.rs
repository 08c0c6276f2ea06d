//! Event-stream ingress: feeds bus events into the availability pipeline.

use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::Value;

use super::Subscriber;
use crate::app::{Alerts, StreamOutcome};
use crate::store::SubscriptionStore;

/// Statistics from a consumer thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Valid events run through the matcher (including failed lookups).
    pub handled: usize,
    /// Events dropped because their payload was not a valid availability event.
    pub rejected: usize,
    /// Number of poll cycles completed.
    pub polls: usize,
}

/// Handle to a background consumer thread. Drop or call `stop()` to shut down.
pub struct ConsumerHandle {
    stop_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<ConsumerStats>>,
}

impl ConsumerHandle {
    /// Stop the consumer and wait for it to finish. Returns stats.
    pub fn stop(mut self) -> ConsumerStats {
        let _ = self.stop_tx.send(());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => ConsumerStats::default(),
        }
    }

    /// Signal stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for ConsumerHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

/// Consume availability events from `subscriber` on a background thread.
///
/// Each event's JSON payload goes to [`Alerts::device_availability_event`].
/// Valid events are acknowledged, even when the subscription lookup fails,
/// since the event itself was received. Undecodable or invalid payloads are
/// nacked.
///
/// ```ignore
/// let queue = InMemoryQueue::new();
/// let handle = consume(alerts.clone(), queue.new_subscriber(), Duration::from_millis(50));
/// queue.publish(Event::json("evt-1", "device.availability", &payload)?)?;
/// let stats = handle.stop();
/// ```
pub fn consume<S, Sub>(
    alerts: Arc<Alerts<S>>,
    subscriber: Sub,
    poll_interval: Duration,
) -> ConsumerHandle
where
    S: SubscriptionStore + 'static,
    Sub: Subscriber + 'static,
{
    let (stop_tx, stop_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let mut stats = ConsumerStats::default();

        loop {
            match stop_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            stats.polls += 1;

            let event = match subscriber.poll(poll_interval.as_millis() as u64) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(error = %err, "availability consumer poll failed");
                    continue;
                }
            };

            let outcome = match event.decode::<Value>() {
                Ok(payload) => alerts.device_availability_event(&payload),
                Err(err) => {
                    tracing::warn!(id = %event.id, error = %err, "availability event payload is not JSON");
                    StreamOutcome::Rejected
                }
            };

            let acked = match outcome {
                StreamOutcome::Rejected => {
                    stats.rejected += 1;
                    subscriber.nack(&event.id, "invalid availability event")
                }
                StreamOutcome::FanoutFailed | StreamOutcome::Completed(_) => {
                    stats.handled += 1;
                    subscriber.ack(&event.id)
                }
            };
            if let Err(err) = acked {
                tracing::warn!(id = %event.id, error = %err, "failed to settle availability event");
            }
        }

        stats
    });

    ConsumerHandle {
        stop_tx,
        handle: Some(handle),
    }
}
