//! Fan-out orchestration: per-consumer isolation, health bookkeeping,
//! suspension, ordering, and crash resume.

mod support;

use cascade::domain::{ConsumerId, ConsumerState, RunId, RunState};
use cascade::error::DeliveryError;
use cascade::port::RunRecord;
use cascade::testkit::config::{batch, consumer};
use cascade::testkit::notifier::CollectingNotifier;
use cascade::testkit::source::ScriptedSource;
use cascade::testkit::store::MemoryRunStore;
use cascade::testkit::transport::ScriptedTransport;

use support::Harness;

#[tokio::test]
async fn one_outcome_per_active_consumer() {
    let harness = Harness::new(
        vec![
            consumer("https://x.example/hook"),
            consumer("https://y.example/hook"),
            consumer("https://z.example/hook"),
        ],
        ScriptedTransport::new(),
    );

    let report = harness.orchestrator.fan_out(batch(&[1, 2])).await.unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.succeeded(), 3);
    assert_eq!(harness.transport.total_calls(), 3);
}

#[tokio::test]
async fn one_consumer_failure_never_blocks_another() {
    // Batch [rec1, rec2], X always succeeds, Y always fails.
    let x = "https://x.example/hook";
    let y = "https://y.example/hook";
    let harness = Harness::new(
        vec![consumer(x), consumer(y)],
        ScriptedTransport::new().with_sticky(y, Err(DeliveryError::transient("503"))),
    );

    let report = harness.orchestrator.fan_out(batch(&[1, 2])).await.unwrap();

    let x_id = ConsumerId::from(x);
    let y_id = ConsumerId::from(y);
    assert!(report.outcome_for(&x_id).unwrap().is_success());

    let y_outcome = report.outcome_for(&y_id).unwrap();
    assert!(y_outcome.is_failed());
    assert_eq!(y_outcome.attempts(), 3);

    // Y's failure count becomes 1; not yet suspended.
    let y_consumer = harness.registry.get(&y_id).unwrap();
    assert_eq!(y_consumer.consecutive_failures, 1);
    assert_eq!(y_consumer.state, ConsumerState::Active);
}

#[tokio::test]
async fn three_consecutive_failing_runs_suspend_the_consumer() {
    let y = "https://y.example/hook";
    let harness = Harness::new(
        vec![consumer("https://x.example/hook"), consumer(y)],
        ScriptedTransport::new().with_sticky(y, Err(DeliveryError::transient("503"))),
    );
    let y_id = ConsumerId::from(y);

    for _ in 0..3 {
        harness.orchestrator.fan_out(batch(&[1])).await.unwrap();
    }
    assert_eq!(
        harness.registry.get(&y_id).unwrap().state,
        ConsumerState::Suspended
    );

    let calls_before_fourth_run = harness.transport.call_count(&y_id);

    // The fourth run's snapshot excludes Y entirely.
    let report = harness.orchestrator.fan_out(batch(&[2])).await.unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert!(report.outcome_for(&y_id).is_none());
    assert_eq!(harness.transport.call_count(&y_id), calls_before_fourth_run);

    let events = harness.events.lock();
    assert_eq!(
        CollectingNotifier::suspended_consumers(&events),
        vec![y_id.clone()]
    );
    assert_eq!(harness.state.snapshot().consumers_suspended, 1);
}

#[tokio::test]
async fn success_resets_the_consecutive_failure_count() {
    let y = "https://y.example/hook";
    let harness = Harness::new(
        vec![consumer(y)],
        ScriptedTransport::new().with_script(
            y,
            vec![
                // Run 1: fail, fail, fail -> Failed (count 1)
                Err(DeliveryError::transient("503")),
                Err(DeliveryError::transient("503")),
                Err(DeliveryError::transient("503")),
                // Run 2: success (count reset)
                Ok(()),
                // Run 3: fail, fail, fail -> Failed (count 1 again)
                Err(DeliveryError::transient("503")),
                Err(DeliveryError::transient("503")),
                Err(DeliveryError::transient("503")),
            ],
        ),
    );
    let y_id = ConsumerId::from(y);

    harness.orchestrator.fan_out(batch(&[1])).await.unwrap();
    harness.orchestrator.fan_out(batch(&[2])).await.unwrap();
    harness.orchestrator.fan_out(batch(&[3])).await.unwrap();

    let y_consumer = harness.registry.get(&y_id).unwrap();
    assert_eq!(y_consumer.consecutive_failures, 1);
    assert_eq!(y_consumer.state, ConsumerState::Active);
}

#[tokio::test]
async fn batches_reach_a_consumer_in_feed_order() {
    let x = "https://x.example/hook";
    let harness = Harness::new(vec![consumer(x)], ScriptedTransport::new());

    harness.orchestrator.fan_out(batch(&[1, 2])).await.unwrap();
    harness.orchestrator.fan_out(batch(&[3])).await.unwrap();
    harness.orchestrator.fan_out(batch(&[4, 5])).await.unwrap();

    let deliveries = harness.transport.deliveries(&ConsumerId::from(x));
    assert_eq!(deliveries, vec![vec![1, 2], vec![3], vec![4, 5]]);
}

#[tokio::test]
async fn empty_active_set_completes_with_empty_report() {
    let harness = Harness::new(vec![], ScriptedTransport::new());

    let report = harness.orchestrator.fan_out(batch(&[1])).await.unwrap();

    assert!(report.outcomes.is_empty());
    assert_eq!(harness.store.latest_run().unwrap().state, RunState::Completed);
}

#[tokio::test]
async fn run_loop_drains_the_source_and_persists_completed_runs() {
    let x = "https://x.example/hook";
    let harness = Harness::new(vec![consumer(x)], ScriptedTransport::new());

    let mut source = ScriptedSource::new().with_batches(vec![batch(&[1]), batch(&[2, 3])]);
    harness.orchestrator.run(&mut source).await.unwrap();

    assert_eq!(harness.store.run_count(), 2);
    assert_eq!(harness.state.snapshot().runs_completed, 2);
    assert_eq!(harness.state.snapshot().deliveries_succeeded, 2);
}

#[tokio::test]
async fn source_failure_is_fatal_to_the_run_loop() {
    let harness = Harness::new(
        vec![consumer("https://x.example/hook")],
        ScriptedTransport::new(),
    );

    let mut source = ScriptedSource::new()
        .with_error(cascade::error::SourceError::Poll("connection refused".into()));

    assert!(harness.orchestrator.run(&mut source).await.is_err());
}

#[tokio::test]
async fn resume_redelivers_only_consumers_without_a_terminal_outcome() {
    let x = "https://x.example/hook";
    let y = "https://y.example/hook";

    // A previous process crashed after X succeeded but before Y finished.
    let run_id = RunId::new();
    let mut record = RunRecord::new(run_id, batch(&[7, 8]), &[consumer(x), consumer(y)]);
    record.start();
    record.outcomes.insert(
        ConsumerId::from(x),
        cascade::domain::DeliveryOutcome::Success {
            attempts: 1,
            latency_ms: 3,
        },
    );
    let store = MemoryRunStore::new().with_incomplete(record);

    let harness = Harness::with_store(
        vec![consumer(x), consumer(y)],
        ScriptedTransport::new(),
        store,
    );

    let mut source = ScriptedSource::new();
    harness.orchestrator.run(&mut source).await.unwrap();

    let x_id = ConsumerId::from(x);
    let y_id = ConsumerId::from(y);
    assert_eq!(harness.transport.call_count(&x_id), 0);
    assert_eq!(harness.transport.deliveries(&y_id), vec![vec![7, 8]]);
    assert_eq!(harness.store.run(&run_id).unwrap().state, RunState::Completed);
}

#[tokio::test]
async fn resume_skips_consumers_suspended_since_the_crash() {
    let y = "https://y.example/hook";

    let run_id = RunId::new();
    let mut record = RunRecord::new(run_id, batch(&[7]), &[consumer(y)]);
    record.start();
    let store = MemoryRunStore::new().with_incomplete(record);

    let harness = Harness::with_store(vec![consumer(y)], ScriptedTransport::new(), store);
    let y_id = ConsumerId::from(y);
    harness.registry.suspend(&y_id);

    let mut source = ScriptedSource::new();
    harness.orchestrator.run(&mut source).await.unwrap();

    assert_eq!(harness.transport.call_count(&y_id), 0);
    assert_eq!(harness.store.run(&run_id).unwrap().state, RunState::Completed);
}

#[tokio::test]
async fn cancelled_deliveries_do_not_count_against_consumer_health() {
    let y = "https://y.example/hook";
    let harness = Harness::new(
        vec![consumer(y)],
        ScriptedTransport::new().with_sticky(y, Err(DeliveryError::transient("503"))),
    );

    harness.trigger.trigger();
    let report = harness.orchestrator.fan_out(batch(&[1])).await.unwrap();

    let y_id = ConsumerId::from(y);
    assert!(report.outcome_for(&y_id).unwrap().is_cancelled());
    assert_eq!(harness.registry.get(&y_id).unwrap().consecutive_failures, 0);
    assert_eq!(harness.state.snapshot().deliveries_cancelled, 1);
}
