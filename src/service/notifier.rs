//! Notifier registry and the built-in log notifier.

use tracing::{info, warn};

use crate::port::{Event, Notifier};

/// Holds all registered notifiers and fans events out to each of them.
#[derive(Default)]
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Send an event to every registered notifier.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }
}

/// Notifier that writes events to the tracing log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        match event {
            Event::DeliveryCompleted(delivery) => {
                if delivery.success {
                    info!(
                        run_id = %delivery.run_id,
                        consumer = %delivery.consumer,
                        attempts = delivery.attempts,
                        "Delivery completed"
                    );
                } else {
                    warn!(
                        run_id = %delivery.run_id,
                        consumer = %delivery.consumer,
                        attempts = delivery.attempts,
                        details = %delivery.details,
                        "Delivery did not complete"
                    );
                }
            }
            Event::ConsumerSuspended { consumer, failures } => {
                warn!(
                    consumer = %consumer,
                    failures,
                    "Consumer suspended; reactivate via the admin interface"
                );
            }
            Event::RunCompleted(run) => {
                info!(
                    run_id = %run.run_id,
                    consumers = run.consumers,
                    succeeded = run.succeeded,
                    failed = run.failed,
                    cancelled = run.cancelled,
                    "Fan-out run completed"
                );
            }
        }
    }
}
