//! Test doubles: a query-counting store, failing adapters, and a recording sink.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use availability_alerts::{
    Alerts, Dispatcher, InMemorySubscriptionStore, Notification, NotificationSink, SinkError,
    StoreError, Subscription, SubscriptionRequest, SubscriptionStore,
};

/// Wraps the in-memory store and counts calls.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemorySubscriptionStore,
    pub upserts: AtomicUsize,
    pub queries: AtomicUsize,
}

impl CountingStore {
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

impl SubscriptionStore for CountingStore {
    fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(subscription)
    }

    fn query_by_model(&self, model: &str) -> Result<Vec<Subscription>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query_by_model(model)
    }
}

/// A store that is always down.
pub struct UnavailableStore;

impl SubscriptionStore for UnavailableStore {
    fn upsert(&self, _subscription: &Subscription) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn query_by_model(&self, _model: &str) -> Result<Vec<Subscription>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// Records every notification it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub seen: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        self.seen.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Refuses every notification.
pub struct FailingSink;

impl NotificationSink for FailingSink {
    fn deliver(&self, _notification: &Notification) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("mail relay down".into()))
    }
}

pub struct Harness {
    pub alerts: Arc<Alerts<CountingStore>>,
    pub store: Arc<CountingStore>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    /// Subscribe through the service, bypassing validation.
    pub fn subscribe(&self, model: &str, email: &str) {
        self.alerts
            .subscriptions()
            .subscribe(SubscriptionRequest {
                model: model.into(),
                email: email.into(),
            })
            .unwrap();
    }
}

/// Alerts over a counting store with an inline recording sink.
pub fn harness() -> Harness {
    let store = Arc::new(CountingStore::default());
    let sink = Arc::new(RecordingSink::default());
    let alerts = Arc::new(Alerts::new(store.clone(), Dispatcher::inline(sink.clone())));
    Harness { alerts, store, sink }
}

pub fn subscribe_body(email: &str, model: &str) -> Value {
    json!({ "model": model, "email": email })
}

pub fn event_body(model: &str, count: i64) -> Value {
    json!({
        "deviceModel": model,
        "availableCount": count,
        "timestamp": "2026-01-15T10:00:00.000Z"
    })
}

pub fn sorted(mut emails: Vec<String>) -> Vec<String> {
    emails.sort();
    emails
}

/// Poll `done` until it holds or five seconds pass. Returns the last result.
pub fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}

/// A sink that holds each delivery until the test opens the gate.
pub struct GatedSink {
    gate: Mutex<std::sync::mpsc::Receiver<()>>,
    pub delivered: AtomicUsize,
}

impl GatedSink {
    pub fn new() -> (Self, std::sync::mpsc::Sender<()>) {
        let (tx, rx) = std::sync::mpsc::channel();
        let sink = Self {
            gate: Mutex::new(rx),
            delivered: AtomicUsize::new(0),
        };
        (sink, tx)
    }
}

impl NotificationSink for GatedSink {
    fn deliver(&self, _notification: &Notification) -> Result<(), SinkError> {
        let gate = self.gate.lock().unwrap();
        gate.recv_timeout(Duration::from_secs(5))
            .map_err(|_| SinkError::Unavailable("gate never opened".into()))?;
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
