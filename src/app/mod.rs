//! Application wiring: builds the collaborators from configuration and
//! runs the fan-out orchestrator until the source closes or shutdown is
//! signalled.

mod orchestrator;
mod shutdown;
mod state;

pub use orchestrator::Orchestrator;
pub use shutdown::{shutdown_channel, Shutdown, ShutdownTrigger};
pub use state::{AppState, StatsSnapshot};

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::{HttpPollingSource, HttpTransport, JsonRunStore};
use crate::admin;
use crate::config::Config;
use crate::delivery::DeliveryWorker;
use crate::error::Result;
use crate::registry::ConsumerRegistry;
use crate::service::{LogNotifier, NotifierRegistry};

/// Main application struct.
pub struct App;

impl App {
    /// Run the delivery daemon until the feed closes or `shutdown` fires.
    pub async fn run(config: Config, shutdown: Shutdown) -> Result<()> {
        let registry = Arc::new(build_registry(&config));
        if registry.is_empty() {
            warn!("No consumers registered, nothing to deliver to");
            return Ok(());
        }
        info!(consumers = registry.len(), "Consumers registered");

        let state = Arc::new(AppState::new());
        let notifiers = Arc::new(build_notifier_registry());

        let store = Arc::new(JsonRunStore::new(config.store.run_file.clone()));
        let transport = Arc::new(HttpTransport::new(config.delivery.request_timeout())?);
        let worker = Arc::new(DeliveryWorker::new(transport, config.delivery.retry_policy()));

        let mut source = HttpPollingSource::new(
            &config.source.feed_url,
            config.source.page_limit,
            config.source.poll_interval(),
        )?;

        if config.admin.enabled {
            let bind = config.admin.bind.clone();
            let admin_registry = registry.clone();
            let admin_state = state.clone();
            let admin_shutdown = shutdown.clone();
            tokio::spawn(async move {
                if let Err(e) =
                    admin::serve(&bind, admin_registry, admin_state, admin_shutdown).await
                {
                    warn!(error = %e, "Admin server stopped");
                }
            });
        }

        let orchestrator = Orchestrator::new(
            registry,
            worker,
            store,
            notifiers,
            state,
            shutdown,
        );
        orchestrator.run(&mut source).await
    }
}

/// Build the consumer registry from configuration.
fn build_registry(config: &Config) -> ConsumerRegistry {
    let registry = ConsumerRegistry::new(config.registry.suspension_threshold);
    for consumer in config.consumers() {
        registry.insert(consumer);
    }
    registry
}

/// Build notifier registry from configuration.
fn build_notifier_registry() -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    registry
}
