//! Event-collecting [`Notifier`] for tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::ConsumerId;
use crate::port::{Event, Notifier};

/// A notifier that records every event it receives.
#[derive(Default)]
pub struct CollectingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl CollectingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the collected events, for asserting after the
    /// notifier has been boxed into a registry.
    #[must_use]
    pub fn events(&self) -> Arc<Mutex<Vec<Event>>> {
        self.events.clone()
    }

    /// Consumers for which a suspension event was observed.
    #[must_use]
    pub fn suspended_consumers(events: &[Event]) -> Vec<ConsumerId> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::ConsumerSuspended { consumer, .. } => Some(consumer.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}
