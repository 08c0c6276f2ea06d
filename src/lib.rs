//! Device availability alerts.
//!
//! Subscribers register interest in a device model; when an availability
//! event for that model arrives with stock on hand, every subscriber is
//! handed to a notification sink.
//!
//! ```text
//! ingress ──▶ validate ──┬──▶ SubscriptionService ──upsert──────────▶ SubscriptionStore
//!                        └──▶ AvailabilityMatcher ──query_by_model──▶ SubscriptionStore
//!                                      └──send──▶ Dispatcher ──▶ NotificationSink
//! ```

pub mod app;
#[cfg(feature = "bus")]
pub mod bus;
pub mod config;
#[cfg(feature = "http")]
pub mod http;
mod matcher;
mod model;
mod service;
pub mod sink;
pub mod store;
pub mod telemetry;
pub mod validate;

pub use app::{Alerts, Reply, StreamOutcome};
pub use config::{Config, ConfigError};
pub use matcher::AvailabilityMatcher;
pub use model::{
    AvailabilityEvent, FanoutReason, FanoutResult, Notification, Subscription,
    SubscriptionRequest,
};
pub use service::SubscriptionService;
pub use sink::{Dispatcher, DispatcherHandle, LogSink, NotificationSink, SinkError};
pub use store::{InMemorySubscriptionStore, StoreError, SubscriptionStore};
pub use validate::{
    validate_availability_event, validate_availability_event_with,
    validate_subscription_request, TimestampPolicy, ValidationError, ValidationErrorKind,
};
