// Concurrency and Ordering Tests

use isopool_core::application::{HandlerRegistry, PoolConfig, WorkerPool};
use isopool_core::domain::{Command, CommandPayload, CommandTag};
use isopool_core::port::HandlerError;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn command(tag: &str, payload: serde_json::Value) -> Command {
    Command::new_test(CommandTag::new(tag), CommandPayload::new(payload))
}

/// Registry with a handler that tracks how many commands run at once
fn tracked_registry(
    sleep_ms: u64,
) -> (Arc<HandlerRegistry>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let active = Arc::new(AtomicUsize::new(0));
    let high_water = Arc::new(AtomicUsize::new(0));

    let mut registry = HandlerRegistry::new();
    {
        let active = active.clone();
        let high_water = high_water.clone();
        registry.register_fn("tracked", move |payload| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            high_water.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(sleep_ms));
            active.fetch_sub(1, Ordering::SeqCst);
            Ok(payload.clone())
        });
    }

    (Arc::new(registry), active, high_water)
}

#[tokio::test]
async fn test_at_most_pool_size_commands_run_concurrently() {
    let (registry, _active, high_water) = tracked_registry(20);
    let pool = WorkerPool::initialize(PoolConfig::new("bounded", 3), registry)
        .await
        .unwrap();

    let commands: Vec<Command> = (0..12).map(|n| command("tracked", json!(n))).collect();
    let outcomes = pool.submit_all(commands).await.unwrap();

    assert_eq!(outcomes.len(), 12);
    assert!(outcomes.iter().all(|o| o.is_success()));

    let observed = high_water.load(Ordering::SeqCst);
    assert!(
        observed <= 3,
        "At most 3 commands may run at once, saw {}",
        observed
    );

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_single_worker_serializes_execution() {
    // With one worker, the second caller's command must not begin executing
    // until the first produced its outcome
    let (registry, _active, high_water) = tracked_registry(30);
    let pool = Arc::new(
        WorkerPool::initialize(PoolConfig::new("serial", 1), registry)
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for n in 0..2 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            pool.submit(command("tracked", json!(n))).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_success());
    }

    assert_eq!(
        high_water.load(Ordering::SeqCst),
        1,
        "A 1-worker pool must never overlap executions"
    );

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_submit_all_is_positional_on_single_worker() {
    let mut registry = HandlerRegistry::new();
    registry.register_fn("square", |payload| {
        let n = payload
            .as_i64()
            .ok_or_else(|| HandlerError::InvalidPayload("expected an integer".to_string()))?;
        Ok(json!(n * n))
    });

    let pool = WorkerPool::initialize(PoolConfig::new("positional", 1), Arc::new(registry))
        .await
        .unwrap();

    let commands = vec![
        command("square", json!(3)),
        command("square", json!(1)),
        command("square", json!(2)),
    ];
    let outcomes = pool.submit_all(commands).await.unwrap();

    let values: Vec<i64> = outcomes
        .iter()
        .map(|o| o.value.as_ref().and_then(|v| v.as_i64()).unwrap_or(-1))
        .collect();
    assert_eq!(values, vec![9, 1, 4]);

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_submit_all_is_positional_despite_completion_order() {
    // The first command sleeps much longer than the second, so with two
    // workers it finishes last; positions must not move
    let mut registry = HandlerRegistry::new();
    registry.register_fn("sleepy_square", |payload| {
        let n = payload
            .as_i64()
            .ok_or_else(|| HandlerError::InvalidPayload("expected an integer".to_string()))?;
        std::thread::sleep(Duration::from_millis((n as u64) * 20));
        Ok(json!(n * n))
    });

    let pool = WorkerPool::initialize(PoolConfig::new("reordered", 2), Arc::new(registry))
        .await
        .unwrap();

    let commands = vec![
        command("sleepy_square", json!(5)), // ~100ms
        command("sleepy_square", json!(1)), // ~20ms
    ];
    let outcomes = pool.submit_all(commands).await.unwrap();

    assert_eq!(outcomes[0].value, Some(json!(25)));
    assert_eq!(outcomes[1].value, Some(json!(1)));

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_two_worker_square_batch_leaves_no_busy_workers() {
    let mut registry = HandlerRegistry::new();
    registry.register_fn("square", |payload| {
        let n = payload
            .as_i64()
            .ok_or_else(|| HandlerError::InvalidPayload("expected an integer".to_string()))?;
        Ok(json!(n * n))
    });

    let pool = WorkerPool::initialize(PoolConfig::new("squares", 2), Arc::new(registry))
        .await
        .unwrap();

    let commands: Vec<Command> = [2, 3, 4, 5]
        .iter()
        .map(|n| command("square", json!(n)))
        .collect();
    let outcomes = pool.submit_all(commands).await.unwrap();

    assert!(outcomes.iter().all(|o| o.is_success()));
    let values: Vec<i64> = outcomes
        .iter()
        .map(|o| o.value.as_ref().and_then(|v| v.as_i64()).unwrap_or(-1))
        .collect();
    assert_eq!(values, vec![4, 9, 16, 25]);

    let status = pool.status().await.unwrap();
    assert_eq!(status.busy, 0, "No worker may stay busy after the batch");
    assert_eq!(status.queued, 0);

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_many_callers_each_get_exactly_one_outcome() {
    let (registry, active, _high_water) = tracked_registry(5);
    let pool = Arc::new(
        WorkerPool::initialize(PoolConfig::new("fanout", 4), registry)
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for n in 0..32 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            pool.submit(command("tracked", json!(n))).await
        }));
    }

    let mut completed = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.is_success());
        completed += 1;
    }
    assert_eq!(completed, 32);
    assert_eq!(active.load(Ordering::SeqCst), 0, "No execution may linger");

    pool.shutdown().await.unwrap();
}
