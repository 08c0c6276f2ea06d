//! Alerts - the transport-agnostic application facade.
//!
//! Every ingress (HTTP, the event bus, a test) goes through `Alerts`, which
//! validates the raw payload, runs the matching component, and maps the
//! outcome to a [`Reply`] with the status code and JSON body that callers see.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use availability_alerts::{Alerts, Dispatcher, InMemorySubscriptionStore, LogSink};
//! use serde_json::json;
//!
//! let (dispatcher, dispatcher_handle) = Dispatcher::spawn(LogSink::new());
//! let alerts = Alerts::new(Arc::new(InMemorySubscriptionStore::new()), dispatcher);
//!
//! let reply = alerts.create_subscription(&json!({ "model": "Pixel 8", "email": "a@x.com" }));
//! assert_eq!(reply.status, 201);
//!
//! let reply = alerts.device_availability(&json!({
//!     "deviceModel": "Pixel 8",
//!     "availableCount": 3,
//!     "timestamp": "2026-01-15T10:00:00.000Z"
//! }));
//! assert_eq!(reply.status, 202);
//!
//! let stats = dispatcher_handle.stop();
//! assert_eq!(stats.delivered, 1);
//! ```

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::matcher::AvailabilityMatcher;
use crate::model::{AvailabilityEvent, FanoutResult};
use crate::service::SubscriptionService;
use crate::sink::Dispatcher;
use crate::store::SubscriptionStore;
use crate::validate::{
    validate_availability_event_with, validate_subscription_request, TimestampPolicy,
    ValidationError,
};

/// Status code and JSON body returned to a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    fn validation_failed(errors: &[ValidationError]) -> Self {
        let details: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        Self::new(400, json!({ "error": "ValidationError", "details": details }))
    }
}

/// What happened to an event delivered without a response channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The payload failed validation and was dropped.
    Rejected,
    /// The event was valid but the subscription lookup failed.
    FanoutFailed,
    /// The event was matched.
    Completed(FanoutResult),
}

/// Wires the validator, the subscription service and the matcher together.
pub struct Alerts<S> {
    subscriptions: SubscriptionService<S>,
    matcher: AvailabilityMatcher<S>,
    timestamp_policy: TimestampPolicy,
}

impl<S: SubscriptionStore> Alerts<S> {
    pub fn new(store: Arc<S>, dispatcher: Dispatcher) -> Self {
        Self {
            subscriptions: SubscriptionService::new(Arc::clone(&store)),
            matcher: AvailabilityMatcher::new(store, dispatcher),
            timestamp_policy: TimestampPolicy::default(),
        }
    }

    /// Set how strictly event timestamps are checked.
    pub fn with_timestamp_policy(mut self, policy: TimestampPolicy) -> Self {
        self.timestamp_policy = policy;
        self
    }

    /// Subscription ingress.
    ///
    /// `201` with the derived id, `400` with field errors, or `500` if the
    /// store write failed.
    pub fn create_subscription(&self, raw: &Value) -> Reply {
        let request = match validate_subscription_request(raw) {
            Ok(request) => request,
            Err(err) => return Reply::validation_failed(std::slice::from_ref(&err)),
        };

        match self.subscriptions.subscribe(request) {
            Ok(subscription) => Reply::new(
                201,
                json!({ "message": "Subscribed successfully", "id": subscription.id }),
            ),
            Err(err) => {
                tracing::error!(error = %err, "failed to store subscription");
                Reply::new(500, json!({ "error": "StoreError", "message": err.to_string() }))
            }
        }
    }

    /// Request/response availability ingress.
    ///
    /// A valid event is always acknowledged with `202`, even when the
    /// subscription lookup fails.
    pub fn device_availability(&self, raw: &Value) -> Reply {
        let event = match self.validate_event(raw) {
            Ok(event) => event,
            Err(errors) => return Reply::validation_failed(&errors),
        };

        self.fan_out(&event);
        Reply::new(202, json!({ "message": "accepted" }))
    }

    /// Event-stream availability ingress; there is no one to reply to.
    ///
    /// Accepts either a bare event or an envelope carrying it under `data`.
    pub fn device_availability_event(&self, raw: &Value) -> StreamOutcome {
        let payload = raw.get("data").filter(|data| data.is_object()).unwrap_or(raw);

        let event = match self.validate_event(payload) {
            Ok(event) => event,
            Err(errors) => {
                let details: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
                tracing::warn!(errors = ?details, "dropping invalid availability event");
                return StreamOutcome::Rejected;
            }
        };

        match self.fan_out(&event) {
            Some(result) => StreamOutcome::Completed(result),
            None => StreamOutcome::FanoutFailed,
        }
    }

    /// Liveness probe. Never touches the store.
    pub fn health(&self) -> Reply {
        Reply::new(
            200,
            json!({
                "status": "healthy",
                "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            }),
        )
    }

    pub fn subscriptions(&self) -> &SubscriptionService<S> {
        &self.subscriptions
    }

    pub fn matcher(&self) -> &AvailabilityMatcher<S> {
        &self.matcher
    }

    fn validate_event(&self, raw: &Value) -> Result<AvailabilityEvent, Vec<ValidationError>> {
        validate_availability_event_with(raw, self.timestamp_policy)
    }

    /// Store failures on the read path are logged, never surfaced.
    fn fan_out(&self, event: &AvailabilityEvent) -> Option<FanoutResult> {
        tracing::info!(
            model = %event.device_model,
            available = event.available_count,
            at = %event.timestamp.to_rfc3339(),
            "device availability update"
        );

        match self.matcher.handle(event) {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::error!(
                    model = %event.device_model,
                    error = %err,
                    "fan-out failed; event acknowledged without notification"
                );
                None
            }
        }
    }
}
