//! AvailabilityMatcher - resolves an availability event to its subscribers.

use std::sync::Arc;

use crate::model::{AvailabilityEvent, FanoutResult, Notification};
use crate::sink::Dispatcher;
use crate::store::{StoreError, SubscriptionStore};

/// Matches availability events against stored subscriptions and hands the
/// recipients to the notification dispatcher.
///
/// Read-only with respect to the store. A model with no subscribers is a
/// normal outcome, not an error.
pub struct AvailabilityMatcher<S> {
    store: Arc<S>,
    dispatcher: Dispatcher,
}

impl<S> Clone for AvailabilityMatcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<S: SubscriptionStore> AvailabilityMatcher<S> {
    pub fn new(store: Arc<S>, dispatcher: Dispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Fan an event out to every subscriber of its device model.
    ///
    /// Events without stock return immediately without touching the store.
    /// Otherwise the store is queried exactly once; recipients keep the
    /// store's order and are not deduplicated.
    pub fn handle(&self, event: &AvailabilityEvent) -> Result<FanoutResult, StoreError> {
        if !event.is_actionable() {
            tracing::debug!(model = %event.device_model, "no availability, skipping notification");
            return Ok(FanoutResult::not_actionable());
        }

        let subscriptions = self.store.query_by_model(&event.device_model)?;
        if subscriptions.is_empty() {
            tracing::debug!(model = %event.device_model, "no subscribers for model");
            return Ok(FanoutResult::no_subscribers());
        }

        let recipients: Vec<String> = subscriptions.into_iter().map(|s| s.email).collect();

        tracing::info!(
            model = %event.device_model,
            available = event.available_count,
            recipients = recipients.len(),
            "notifying subscribers"
        );
        self.dispatcher.send(Notification {
            recipients: recipients.clone(),
            event: event.clone(),
        });

        Ok(FanoutResult::notified(recipients))
    }
}
