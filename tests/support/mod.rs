//! Shared wiring for orchestrator integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use cascade::app::{shutdown_channel, AppState, Orchestrator, ShutdownTrigger};
use cascade::delivery::{DeliveryWorker, RetryPolicy};
use cascade::domain::Consumer;
use cascade::port::{DeliveryTransport, Event, RunStore};
use cascade::registry::ConsumerRegistry;
use cascade::service::NotifierRegistry;
use cascade::testkit::notifier::CollectingNotifier;
use cascade::testkit::store::MemoryRunStore;
use cascade::testkit::transport::ScriptedTransport;

/// Fully wired orchestrator over scripted collaborators, with handles to
/// everything a test wants to assert on.
pub struct Harness {
    pub registry: Arc<ConsumerRegistry>,
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<MemoryRunStore>,
    pub state: Arc<AppState>,
    pub events: Arc<Mutex<Vec<Event>>>,
    pub trigger: ShutdownTrigger,
    pub orchestrator: Orchestrator,
}

impl Harness {
    pub fn new(consumers: Vec<Consumer>, transport: ScriptedTransport) -> Self {
        Self::build(consumers, transport, fast_policy(), MemoryRunStore::new())
    }

    pub fn with_store(
        consumers: Vec<Consumer>,
        transport: ScriptedTransport,
        store: MemoryRunStore,
    ) -> Self {
        Self::build(consumers, transport, fast_policy(), store)
    }

    pub fn build(
        consumers: Vec<Consumer>,
        transport: ScriptedTransport,
        policy: RetryPolicy,
        store: MemoryRunStore,
    ) -> Self {
        let registry = Arc::new(ConsumerRegistry::new(3));
        for consumer in consumers {
            registry.insert(consumer);
        }

        let transport = Arc::new(transport);
        let store = Arc::new(store);
        let state = Arc::new(AppState::new());

        let collecting = CollectingNotifier::new();
        let events = collecting.events();
        let mut notifiers = NotifierRegistry::new();
        notifiers.register(Box::new(collecting));

        let (trigger, shutdown) = shutdown_channel();
        let worker = Arc::new(DeliveryWorker::new(
            transport.clone() as Arc<dyn DeliveryTransport>,
            policy,
        ));

        let orchestrator = Orchestrator::new(
            registry.clone(),
            worker,
            store.clone() as Arc<dyn RunStore>,
            Arc::new(notifiers),
            state.clone(),
            shutdown,
        );

        Harness {
            registry,
            transport,
            store,
            state,
            events,
            trigger,
            orchestrator,
        }
    }
}

/// Short waits so retry-heavy scenarios finish quickly.
pub fn fast_policy() -> RetryPolicy {
    cascade::testkit::config::fast_retry_policy()
}
