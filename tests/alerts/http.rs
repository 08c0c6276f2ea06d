//! HTTP transport tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use availability_alerts::http;
use availability_alerts::{
    Alerts, Dispatcher, InMemorySubscriptionStore, StoreError, Subscription, SubscriptionStore,
};
use serde_json::{json, Value};

use crate::support::{harness, sorted, RecordingSink, UnavailableStore};

/// Bind to port 0 and return the base URL.
async fn start_server<S: SubscriptionStore + 'static>(alerts: Arc<Alerts<S>>) -> String {
    let app = http::router(alerts);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_check() {
    let base = start_server(harness().alerts).await;

    let resp = reqwest::get(format!("{base}/api/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_check_without_store() {
    let alerts = Arc::new(Alerts::new(
        Arc::new(UnavailableStore),
        Dispatcher::inline(RecordingSink::default()),
    ));
    let base = start_server(alerts).await;

    let resp = reqwest::get(format!("{base}/api/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn subscribe_then_notify() {
    let h = harness();
    let base = start_server(h.alerts.clone()).await;
    let client = reqwest::Client::new();

    for email in ["a@x.com", "b@x.com"] {
        let resp = client
            .post(format!("{base}/subscriptions"))
            .json(&json!({ "model": "Pixel 8", "email": email }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Subscribed successfully");
        assert_eq!(body["id"], format!("{email}-Pixel 8"));
    }

    let resp = client
        .post(format!("{base}/integration/events/device-availability"))
        .json(&json!({
            "deviceModel": "Pixel 8",
            "availableCount": 3,
            "timestamp": "2026-01-15T10:00:00.000Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "message": "accepted" }));

    let sent = h.sink.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sorted(sent[0].recipients.clone()), vec!["a@x.com", "b@x.com"]);
}

#[tokio::test]
async fn invalid_subscription_returns_field_errors() {
    let base = start_server(harness().alerts).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/subscriptions"))
        .json(&json!({ "model": "", "email": "x@y.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "error": "ValidationError", "details": ["model must be a non-empty string"] })
    );
}

#[tokio::test]
async fn invalid_event_returns_all_errors() {
    let base = start_server(harness().alerts).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/integration/events/device-availability"))
        .json(&json!({ "deviceModel": "iPad", "availableCount": -1, "timestamp": "not-a-date" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unparseable_bodies_are_rejected() {
    let base = start_server(harness().alerts).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/subscriptions"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Invalid JSON body" }));

    let resp = client
        .post(format!("{base}/integration/events/device-availability"))
        .body("")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid JSON body" }));
}

#[tokio::test]
async fn store_outage_on_subscribe_is_500() {
    let alerts = Arc::new(Alerts::new(
        Arc::new(UnavailableStore),
        Dispatcher::inline(RecordingSink::default()),
    ));
    let base = start_server(alerts).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/subscriptions"))
        .json(&json!({ "model": "iPad", "email": "a@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
}

/// Holds each upsert until the test opens the gate.
struct GatedStore {
    inner: InMemorySubscriptionStore,
    gate: Mutex<mpsc::Receiver<()>>,
    entered: AtomicBool,
}

impl SubscriptionStore for GatedStore {
    fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError> {
        self.entered.store(true, Ordering::SeqCst);
        self.gate
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5))
            .map_err(|_| StoreError::Unavailable("gate never opened".into()))?;
        self.inner.upsert(subscription)
    }

    fn query_by_model(&self, model: &str) -> Result<Vec<Subscription>, StoreError> {
        self.inner.query_by_model(model)
    }
}

#[tokio::test]
async fn blocked_store_does_not_stall_other_requests() {
    let (open_gate, gate) = mpsc::channel();
    let store = Arc::new(GatedStore {
        inner: InMemorySubscriptionStore::new(),
        gate: Mutex::new(gate),
        entered: AtomicBool::new(false),
    });
    let alerts = Arc::new(Alerts::new(
        store.clone(),
        Dispatcher::inline(RecordingSink::default()),
    ));
    let base = start_server(alerts).await;
    let client = reqwest::Client::new();

    let pending = tokio::spawn({
        let client = client.clone();
        let url = format!("{base}/subscriptions");
        async move {
            client
                .post(url)
                .json(&json!({ "model": "Pixel 8", "email": "a@x.com" }))
                .send()
                .await
                .unwrap()
                .status()
        }
    });

    tokio::time::timeout(Duration::from_secs(2), async {
        while !store.entered.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("upsert never started");

    let health = tokio::time::timeout(
        Duration::from_secs(2),
        client.get(format!("{base}/api/health")).send(),
    )
    .await
    .expect("health check stalled behind the store")
    .unwrap();
    assert_eq!(health.status(), 200);

    open_gate.send(()).unwrap();
    assert_eq!(pending.await.unwrap(), 201);
    assert_eq!(store.inner.len().unwrap(), 1);
}
