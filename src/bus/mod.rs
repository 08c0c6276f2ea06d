//! In-process bus - the event-stream side of the alert pipeline.
//!
//! ```text
//! ┌──────────────┐  device.availability   ┌───────────────┐
//! │ upstream     │ ─────────────────────▶ │ InMemoryQueue │ ──poll──▶ consume() ──▶ Alerts
//! │ inventory    │                        └───────────────┘
//! └──────────────┘                                ▲
//!                                                 │ notification.requested
//!                                        QueueSink ┘ (optional sink)
//! ```
//!
//! `Publisher` and `Subscriber` are the seams for real brokers; the
//! in-memory queue serves tests and single-process deployments.

mod consumer;
mod in_memory_queue;
mod publisher;

pub use consumer::{consume, ConsumerHandle, ConsumerStats};
pub use in_memory_queue::InMemoryQueue;
pub use publisher::{Event, PublishError, Publisher, Subscriber};

/// Event type for availability events published onto the bus.
pub const DEVICE_AVAILABILITY: &str = "device.availability";
