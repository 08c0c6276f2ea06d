//! In-memory queue for testing and single-process scenarios.

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use super::{Event, PublishError, Publisher, Subscriber};

/// Thread-safe in-memory queue implementing both `Publisher` and `Subscriber`.
///
/// Events are kept in an append-only log. Each subscriber created with
/// [`InMemoryQueue::new_subscriber`] tracks its own read position, so every
/// subscriber sees every event.
///
/// ```
/// use availability_alerts::bus::{Event, InMemoryQueue, Publisher, Subscriber};
///
/// let queue = InMemoryQueue::new();
/// queue.publish(Event::new("evt-1", "device.availability", b"{}".to_vec())).unwrap();
///
/// let event = queue.poll(100).unwrap().unwrap();
/// assert_eq!(event.event_type, "device.availability");
/// ```
#[derive(Clone)]
pub struct InMemoryQueue {
    log: Arc<RwLock<Vec<Event>>>,
    position: Arc<Mutex<usize>>,
    acked: Arc<Mutex<Vec<String>>>,
    nacked: Arc<Mutex<Vec<String>>>,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> PublishError {
    PublishError::ConnectionFailed("queue lock poisoned".into())
}

impl InMemoryQueue {
    /// Create a new in-memory queue.
    pub fn new() -> Self {
        Self {
            log: Arc::new(RwLock::new(Vec::new())),
            position: Arc::new(Mutex::new(0)),
            acked: Arc::new(Mutex::new(Vec::new())),
            nacked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a new subscriber that shares the same log but has its own position.
    pub fn new_subscriber(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            position: Arc::new(Mutex::new(0)),
            acked: Arc::new(Mutex::new(Vec::new())),
            nacked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get all events in the log.
    pub fn events(&self) -> Vec<Event> {
        self.log.read().map(|log| log.clone()).unwrap_or_default()
    }

    /// Find all events matching a type.
    pub fn find_all_by_type(&self, event_type: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get the total number of events in the log.
    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.len()).unwrap_or_default()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Event IDs acknowledged by this subscriber.
    pub fn acknowledged(&self) -> Vec<String> {
        self.acked.lock().map(|ids| ids.clone()).unwrap_or_default()
    }

    /// Event IDs rejected by this subscriber.
    pub fn rejected(&self) -> Vec<String> {
        self.nacked.lock().map(|ids| ids.clone()).unwrap_or_default()
    }
}

impl Publisher for InMemoryQueue {
    fn publish(&self, event: Event) -> Result<(), PublishError> {
        self.log.write().map_err(|_| poisoned())?.push(event);
        Ok(())
    }
}

impl Subscriber for InMemoryQueue {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            {
                let log = self.log.read().map_err(|_| poisoned())?;
                let mut pos = self.position.lock().map_err(|_| poisoned())?;

                if *pos < log.len() {
                    let event = log[*pos].clone();
                    *pos += 1;
                    return Ok(Some(event));
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            // Small sleep to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn ack(&self, event_id: &str) -> Result<(), PublishError> {
        self.acked
            .lock()
            .map_err(|_| poisoned())?
            .push(event_id.to_string());
        Ok(())
    }

    fn nack(&self, event_id: &str, _reason: &str) -> Result<(), PublishError> {
        self.nacked
            .lock()
            .map_err(|_| poisoned())?
            .push(event_id.to_string());
        Ok(())
    }
}
