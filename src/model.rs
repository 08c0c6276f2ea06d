//! Domain types shared by the validator, the services, and the adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A standing interest of one subscriber in one device model.
///
/// Stored as a document keyed by [`Subscription::id`]. The model is kept
/// under `modelKey` so the store can filter on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    #[serde(rename = "modelKey")]
    pub model: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Build a subscription for `request`, stamped with `created_at`.
    pub fn new(request: SubscriptionRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Self::key(&request.email, &request.model),
            model: request.model,
            email: request.email,
            created_at,
        }
    }

    /// The deduplication key for an (email, model) pair.
    pub fn key(email: &str, model: &str) -> String {
        format!("{}-{}", email, model)
    }
}

/// A validated request to subscribe `email` to availability of `model`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub model: String,
    pub email: String,
}

/// A validated "device became available" event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEvent {
    pub device_model: String,
    pub available_count: u64,
    pub timestamp: DateTime<Utc>,
}

impl AvailabilityEvent {
    /// Only events with stock on hand trigger a fan-out.
    pub fn is_actionable(&self) -> bool {
        self.available_count > 0
    }
}

/// Why a fan-out ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanoutReason {
    /// `availableCount` was zero; the store was not queried.
    NotActionable,
    /// The store returned no subscriptions for the model.
    NoSubscribers,
    /// Recipients were resolved and handed to the sink.
    Notified,
}

/// Outcome of matching one availability event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutResult {
    pub notified: Vec<String>,
    pub skipped: bool,
    pub reason: FanoutReason,
}

impl FanoutResult {
    pub(crate) fn not_actionable() -> Self {
        Self {
            notified: Vec::new(),
            skipped: true,
            reason: FanoutReason::NotActionable,
        }
    }

    pub(crate) fn no_subscribers() -> Self {
        Self {
            notified: Vec::new(),
            skipped: false,
            reason: FanoutReason::NoSubscribers,
        }
    }

    pub(crate) fn notified(recipients: Vec<String>) -> Self {
        Self {
            notified: recipients,
            skipped: false,
            reason: FanoutReason::Notified,
        }
    }
}

/// The message handed to a notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipients: Vec<String>,
    pub event: AvailabilityEvent,
}
