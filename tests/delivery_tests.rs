//! Delivery worker retry and backoff behavior.

use std::sync::Arc;
use std::time::Duration;

use cascade::app::shutdown_channel;
use cascade::delivery::{DeliveryWorker, RetryPolicy};
use cascade::domain::ConsumerId;
use cascade::error::DeliveryError;
use cascade::port::DeliveryTransport;
use cascade::testkit::config::{batch, consumer, fast_retry_policy};
use cascade::testkit::transport::ScriptedTransport;

fn worker(transport: Arc<ScriptedTransport>, policy: RetryPolicy) -> DeliveryWorker {
    DeliveryWorker::new(transport as Arc<dyn DeliveryTransport>, policy)
}

#[tokio::test]
async fn first_attempt_success_makes_one_call() {
    let endpoint = "https://x.example/hook";
    let transport = Arc::new(ScriptedTransport::new());
    let worker = worker(transport.clone(), fast_retry_policy());
    let (_trigger, shutdown) = shutdown_channel();

    let outcome = worker
        .deliver(&consumer(endpoint), &batch(&[1, 2]), &shutdown)
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(transport.call_count(&ConsumerId::from(endpoint)), 1);
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let endpoint = "https://x.example/hook";
    let transport = Arc::new(ScriptedTransport::new().with_script(
        endpoint,
        vec![
            Err(DeliveryError::transient("503")),
            Err(DeliveryError::transient("503")),
            Ok(()),
        ],
    ));
    let worker = worker(transport.clone(), fast_retry_policy());
    let (_trigger, shutdown) = shutdown_channel();

    let outcome = worker
        .deliver(&consumer(endpoint), &batch(&[1]), &shutdown)
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.attempts(), 3);
    assert_eq!(transport.call_count(&ConsumerId::from(endpoint)), 3);
}

#[tokio::test]
async fn transient_failures_exhaust_the_attempt_budget() {
    let endpoint = "https://x.example/hook";
    let transport = Arc::new(
        ScriptedTransport::new().with_sticky(endpoint, Err(DeliveryError::transient("timeout"))),
    );
    let worker = worker(transport.clone(), fast_retry_policy());
    let (_trigger, shutdown) = shutdown_channel();

    let outcome = worker
        .deliver(&consumer(endpoint), &batch(&[1]), &shutdown)
        .await;

    assert!(outcome.is_failed());
    assert_eq!(outcome.attempts(), 3);
    assert_eq!(transport.call_count(&ConsumerId::from(endpoint)), 3);
}

#[tokio::test]
async fn permanent_failure_produces_zero_retries() {
    let endpoint = "https://x.example/hook";
    let transport = Arc::new(
        ScriptedTransport::new().with_sticky(endpoint, Err(DeliveryError::permanent("410 gone"))),
    );
    let worker = worker(transport.clone(), fast_retry_policy());
    let (_trigger, shutdown) = shutdown_channel();

    let outcome = worker
        .deliver(&consumer(endpoint), &batch(&[1]), &shutdown)
        .await;

    assert!(outcome.is_failed());
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(transport.call_count(&ConsumerId::from(endpoint)), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_waits_grow_exponentially() {
    let endpoint = "https://x.example/hook";
    let transport = Arc::new(
        ScriptedTransport::new().with_sticky(endpoint, Err(DeliveryError::transient("503"))),
    );
    let policy = RetryPolicy {
        max_attempts: 3,
        first_interval: Duration::from_secs(5),
        backoff_multiplier: 2.0,
        max_interval: Duration::from_secs(60),
    };
    let worker = worker(transport.clone(), policy);
    let (_trigger, shutdown) = shutdown_channel();

    let started = tokio::time::Instant::now();
    let outcome = worker
        .deliver(&consumer(endpoint), &batch(&[1]), &shutdown)
        .await;

    // 5s before the second attempt, 10s before the third.
    assert!(outcome.is_failed());
    assert!(started.elapsed() >= Duration::from_secs(15));
}

#[tokio::test]
async fn shutdown_prevents_further_retries() {
    let endpoint = "https://x.example/hook";
    let transport = Arc::new(
        ScriptedTransport::new().with_sticky(endpoint, Err(DeliveryError::transient("503"))),
    );
    let worker = worker(transport.clone(), fast_retry_policy());
    let (trigger, shutdown) = shutdown_channel();

    // Signal before delivery: the first attempt still runs to completion,
    // but no retry follows it.
    trigger.trigger();
    let outcome = worker
        .deliver(&consumer(endpoint), &batch(&[1]), &shutdown)
        .await;

    assert!(outcome.is_cancelled());
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(transport.call_count(&ConsumerId::from(endpoint)), 1);
}
