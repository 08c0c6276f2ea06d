//! Fire-and-forget dispatch of notifications to a sink.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::{NotificationSink, SinkError};
use crate::model::Notification;

/// Counters from a background dispatcher.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchStats {
    /// Notifications the sink accepted.
    pub delivered: usize,
    /// Notifications the sink failed to deliver.
    pub failed: usize,
}

enum Command {
    Deliver(Notification),
    Stop,
}

#[derive(Clone)]
enum Mode {
    Inline(Arc<dyn NotificationSink>),
    Background(mpsc::Sender<Command>),
}

/// One-way sender of notifications.
///
/// `send` never returns an error. In background mode it never blocks on the
/// sink; inline mode runs the sink before returning. Clone-friendly: clones feed the same sink or worker.
#[derive(Clone)]
pub struct Dispatcher {
    mode: Mode,
}

impl Dispatcher {
    /// Deliver on the caller's thread. Sink errors are logged and dropped.
    ///
    /// `send` returns only once the sink does, so a slow sink holds up the
    /// ingress reply. Meant for tests and sinks that only buffer in memory;
    /// services should use [`Dispatcher::spawn`].
    pub fn inline<S: NotificationSink + 'static>(sink: S) -> Self {
        Self {
            mode: Mode::Inline(Arc::new(sink)),
        }
    }

    /// Deliver on a background worker thread.
    ///
    /// The returned handle stops the worker; notifications sent before
    /// `stop()` are delivered first.
    pub fn spawn<S: NotificationSink + 'static>(sink: S) -> (Self, DispatcherHandle) {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let mut stats = DispatchStats::default();

            for command in rx {
                match command {
                    Command::Deliver(notification) => match deliver(&sink, &notification) {
                        Ok(()) => stats.delivered += 1,
                        Err(_) => stats.failed += 1,
                    },
                    Command::Stop => break,
                }
            }

            stats
        });

        let dispatcher = Self {
            mode: Mode::Background(tx.clone()),
        };
        let handle = DispatcherHandle {
            stop_tx: tx,
            handle: Some(handle),
        };
        (dispatcher, handle)
    }

    /// Hand a notification off for delivery.
    pub fn send(&self, notification: Notification) {
        match &self.mode {
            Mode::Inline(sink) => {
                let _ = deliver(sink.as_ref(), &notification);
            }
            Mode::Background(tx) => {
                if tx.send(Command::Deliver(notification)).is_err() {
                    tracing::warn!("notification dispatcher stopped; notification dropped");
                }
            }
        }
    }
}

fn deliver<S: NotificationSink + ?Sized>(sink: &S, notification: &Notification) -> Result<(), SinkError> {
    let result = sink.deliver(notification);
    if let Err(err) = &result {
        tracing::warn!(
            model = %notification.event.device_model,
            recipients = notification.recipients.len(),
            error = %err,
            "notification delivery failed"
        );
    }
    result
}

/// Handle to a background dispatcher. Drop or call `stop()` to shut down.
pub struct DispatcherHandle {
    stop_tx: mpsc::Sender<Command>,
    handle: Option<JoinHandle<DispatchStats>>,
}

impl DispatcherHandle {
    /// Deliver what is already queued, stop the worker, and return its stats.
    pub fn stop(mut self) -> DispatchStats {
        let _ = self.stop_tx.send(Command::Stop);
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => DispatchStats::default(),
        }
    }
}

impl Drop for DispatcherHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(Command::Stop);
    }
}
