//! Subscription storage - the document store behind the alert pipeline.
//!
//! The pipeline needs two things from a store: an atomic per-key upsert and
//! an exact-match query on the device model. Anything with those two
//! operations (Cosmos, DynamoDB, a SQL table with a unique key) can back it.
//!
//! ## Example
//!
//! ```
//! use availability_alerts::{InMemorySubscriptionStore, Subscription, SubscriptionRequest, SubscriptionStore};
//! use chrono::Utc;
//!
//! let store = InMemorySubscriptionStore::new();
//! let request = SubscriptionRequest { model: "Pixel 8".into(), email: "a@x.com".into() };
//! store.upsert(&Subscription::new(request, Utc::now())).unwrap();
//!
//! let matches = store.query_by_model("Pixel 8").unwrap();
//! assert_eq!(matches.len(), 1);
//! ```

mod in_memory;

use std::fmt;
use std::sync::Arc;

use crate::model::Subscription;

pub use in_memory::InMemorySubscriptionStore;

/// Storage for subscriptions, keyed by [`Subscription::id`].
pub trait SubscriptionStore: Send + Sync {
    /// Insert the subscription, or fully replace the one with the same id.
    ///
    /// Must be atomic per key: concurrent upserts of one id never leave two
    /// records or a partially written one.
    fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError>;

    /// All subscriptions whose model equals `model` exactly, in any order.
    fn query_by_model(&self, model: &str) -> Result<Vec<Subscription>, StoreError>;
}

impl<S: SubscriptionStore + ?Sized> SubscriptionStore for Arc<S> {
    fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError> {
        (**self).upsert(subscription)
    }

    fn query_by_model(&self, model: &str) -> Result<Vec<Subscription>, StoreError> {
        (**self).query_by_model(model)
    }
}

/// Error type for subscription store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or is in an unusable state.
    Unavailable(String),
    /// A document could not be encoded or decoded.
    Serde(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "subscription store unavailable: {}", msg),
            StoreError::Serde(msg) => write!(f, "subscription serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}
