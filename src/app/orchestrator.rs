//! Fan-out orchestration.
//!
//! Given one change batch, deliver it to every currently active consumer,
//! independently and concurrently, and update consumer health from the
//! outcomes. Batches are processed strictly in feed order, which preserves
//! per-consumer delivery order; cross-consumer ordering is not a goal.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::delivery::DeliveryWorker;
use crate::domain::{
    ChangeBatch, Consumer, ConsumerId, ConsumerOutcome, DeliveryOutcome, FanOutReport, RunId,
};
use crate::error::Result;
use crate::port::{ChangeSource, DeliveryEvent, Event, RunEvent, RunRecord, RunStore};
use crate::registry::{ConsumerRegistry, FailureMark};
use crate::service::NotifierRegistry;

use super::shutdown::Shutdown;
use super::state::AppState;

/// Coordinates concurrent delivery of change batches to all registered
/// consumers.
pub struct Orchestrator {
    registry: Arc<ConsumerRegistry>,
    worker: Arc<DeliveryWorker>,
    store: Arc<dyn RunStore>,
    notifiers: Arc<NotifierRegistry>,
    state: Arc<AppState>,
    shutdown: Shutdown,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        registry: Arc<ConsumerRegistry>,
        worker: Arc<DeliveryWorker>,
        store: Arc<dyn RunStore>,
        notifiers: Arc<NotifierRegistry>,
        state: Arc<AppState>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            registry,
            worker,
            store,
            notifiers,
            state,
            shutdown,
        }
    }

    /// Drain the change source until it closes or shutdown is signalled.
    ///
    /// Resumes an interrupted run from the store first. Each batch is
    /// fanned out to completion before the next is read, so a consumer
    /// sees batches in feed order. A source read failure is fatal;
    /// consumer-level failures never are.
    pub async fn run(&self, source: &mut dyn ChangeSource) -> Result<()> {
        self.resume_incomplete().await?;

        loop {
            if self.shutdown.is_cancelled() {
                info!("Shutdown signalled, stopping run loop");
                return Ok(());
            }

            let batch = tokio::select! {
                batch = source.next_batch() => batch?,
                () = self.shutdown.cancelled() => {
                    info!("Shutdown signalled while waiting for changes");
                    return Ok(());
                }
            };

            match batch {
                Some(batch) => {
                    self.fan_out(batch).await?;
                }
                None => {
                    info!(source = source.source_name(), "Change source closed");
                    return Ok(());
                }
            }
        }
    }

    /// Deliver one batch to every active consumer and report per-consumer
    /// outcomes.
    ///
    /// The active set is snapshotted once at run start; consumers
    /// registered mid-run wait for the next batch. The run completes only
    /// when every dispatched delivery has a terminal outcome.
    pub async fn fan_out(&self, batch: ChangeBatch) -> Result<FanOutReport> {
        let run_id = RunId::new();
        let consumers = self.registry.list_active();

        let mut record = RunRecord::new(run_id, batch.clone(), &consumers);
        record.start();
        self.store.begin_run(&record)?;

        info!(
            run_id = %run_id,
            consumers = consumers.len(),
            records = batch.len(),
            "Fan-out run dispatched"
        );

        let report = self.dispatch(run_id, batch, consumers).await;
        self.store.complete_run(&run_id)?;

        self.state.record_run(&report);
        self.notifiers
            .notify_all(Event::RunCompleted(RunEvent::from(&report)));
        Ok(report)
    }

    /// Re-deliver an interrupted run to the consumers that never reached a
    /// terminal outcome.
    async fn resume_incomplete(&self) -> Result<()> {
        let Some(record) = self.store.load_incomplete()? else {
            return Ok(());
        };

        let remaining = record.remaining_consumers();
        info!(
            run_id = %record.run_id,
            remaining = remaining.len(),
            "Resuming interrupted fan-out run"
        );

        // Suspended-since-then or deregistered consumers are skipped; the
        // snapshot only decides who was owed the batch, the registry still
        // decides who is deliverable.
        let consumers: Vec<Consumer> = remaining
            .iter()
            .filter_map(|id| match self.registry.get(id) {
                Some(consumer) if consumer.is_active() => Some(consumer),
                Some(_) => {
                    warn!(consumer = %id, "Skipping resume for suspended consumer");
                    None
                }
                None => {
                    warn!(consumer = %id, "Skipping resume for deregistered consumer");
                    None
                }
            })
            .collect();

        let report = self.dispatch(record.run_id, record.batch, consumers).await;
        self.store.complete_run(&record.run_id)?;

        self.state.record_run(&report);
        self.notifiers
            .notify_all(Event::RunCompleted(RunEvent::from(&report)));
        Ok(())
    }

    /// Spawn one delivery task per consumer and collect terminal outcomes
    /// as they arrive.
    async fn dispatch(
        &self,
        run_id: RunId,
        batch: ChangeBatch,
        consumers: Vec<Consumer>,
    ) -> FanOutReport {
        let started_at = Utc::now();
        let sequence_range = batch.sequence_range();
        let batch = Arc::new(batch);

        let mut tasks = JoinSet::new();
        for consumer in consumers {
            let worker = self.worker.clone();
            let batch = batch.clone();
            let shutdown = self.shutdown.clone();
            tasks.spawn(async move {
                let outcome = worker.deliver(&consumer, &batch, &shutdown).await;
                (consumer.id, outcome)
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((consumer, outcome)) => {
                    self.apply_outcome(run_id, &consumer, &outcome);
                    outcomes.push(ConsumerOutcome { consumer, outcome });
                }
                Err(e) => {
                    error!(run_id = %run_id, error = %e, "Delivery task aborted");
                }
            }
        }

        FanOutReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            sequence_range,
            outcomes,
        }
    }

    /// Persist one consumer's outcome and update its health.
    ///
    /// Single-writer discipline: this is the only place delivery outcomes
    /// touch registry state. Cancelled deliveries leave health untouched.
    fn apply_outcome(&self, run_id: RunId, consumer: &ConsumerId, outcome: &DeliveryOutcome) {
        if let Err(e) = self.store.record_outcome(&run_id, consumer, outcome) {
            error!(
                run_id = %run_id,
                consumer = %consumer,
                error = %e,
                "Failed to persist delivery outcome"
            );
        }

        match outcome {
            DeliveryOutcome::Success { .. } => {
                self.registry.mark_succeeded(consumer);
            }
            DeliveryOutcome::Failed { .. } => {
                if let FailureMark::Suspended { failures } = self.registry.mark_failed(consumer) {
                    self.state.record_suspension();
                    self.notifiers.notify_all(Event::ConsumerSuspended {
                        consumer: consumer.clone(),
                        failures,
                    });
                }
            }
            DeliveryOutcome::Cancelled { .. } => {}
        }

        self.notifiers
            .notify_all(Event::DeliveryCompleted(DeliveryEvent::from_outcome(
                run_id, consumer, outcome,
            )));
    }
}
