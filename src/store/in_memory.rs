//! InMemorySubscriptionStore - HashMap-backed subscription store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{StoreError, SubscriptionStore};
use crate::model::Subscription;

/// In-memory subscription store backed by a HashMap of JSON documents.
///
/// Storage key is the subscription id. Clone-friendly via Arc: clones share
/// the same documents.
#[derive(Clone)]
pub struct InMemorySubscriptionStore {
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl Default for InMemorySubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySubscriptionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Load a subscription by id.
    pub fn get(&self, id: &str) -> Result<Option<Subscription>, StoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        documents
            .get(id)
            .map(|bytes| serde_json::from_slice(bytes).map_err(StoreError::from))
            .transpose()
    }

    /// Number of stored subscriptions.
    pub fn len(&self) -> Result<usize, StoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        Ok(documents.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl SubscriptionStore for InMemorySubscriptionStore {
    fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(subscription)?;

        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        documents.insert(subscription.id.clone(), bytes);
        Ok(())
    }

    fn query_by_model(&self, model: &str) -> Result<Vec<Subscription>, StoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;

        let mut results = Vec::new();
        for bytes in documents.values() {
            let subscription: Subscription = serde_json::from_slice(bytes)?;
            if subscription.model == model {
                results.push(subscription);
            }
        }

        Ok(results)
    }
}
