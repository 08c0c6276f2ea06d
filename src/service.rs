//! SubscriptionService - idempotent subscription writes.

use std::sync::Arc;

use chrono::Utc;

use crate::model::{Subscription, SubscriptionRequest};
use crate::store::{StoreError, SubscriptionStore};

/// Stores subscriptions keyed by `email-model`, so repeating a request for
/// the same pair overwrites the earlier record instead of adding one.
pub struct SubscriptionService<S> {
    store: Arc<S>,
}

impl<S> Clone for SubscriptionService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SubscriptionStore> SubscriptionService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Upsert the subscription for `request` and return the stored record.
    pub fn subscribe(&self, request: SubscriptionRequest) -> Result<Subscription, StoreError> {
        let subscription = Subscription::new(request, Utc::now());
        self.store.upsert(&subscription)?;

        tracing::info!(
            id = %subscription.id,
            model = %subscription.model,
            "subscription stored"
        );
        Ok(subscription)
    }
}
