// Dispatch Edge Case Tests

use isopool_core::application::{HandlerRegistry, PoolConfig, WorkerPool};
use isopool_core::domain::{Command, CommandPayload, CommandTag};
use isopool_core::port::HandlerError;
use isopool_core::PoolError;
use serde_json::json;
use std::sync::Arc;

fn command(tag: &str, payload: serde_json::Value) -> Command {
    Command::new_test(CommandTag::new(tag), CommandPayload::new(payload))
}

fn registry() -> Arc<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    registry.register_fn("square", |payload| {
        let n = payload
            .as_i64()
            .ok_or_else(|| HandlerError::InvalidPayload("expected an integer".to_string()))?;
        Ok(json!(n * n))
    });
    registry.register_fn("explode", |_payload: &serde_json::Value| -> Result<serde_json::Value, HandlerError> {
        panic!("synthetic handler panic");
    });
    Arc::new(registry)
}

#[tokio::test]
async fn test_unknown_command_returns_failure_outcome() {
    let pool = WorkerPool::initialize(PoolConfig::new("unknown", 1), registry())
        .await
        .unwrap();

    // An unrecognized tag is a failure outcome, never an Err out of submit
    let outcome = pool
        .submit(command("transmogrify", json!(null)))
        .await
        .expect("submit itself must succeed");

    assert!(!outcome.is_success());
    assert!(outcome
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("unknown command: transmogrify"));

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_handler_error_keeps_worker_usable() {
    let pool = WorkerPool::initialize(PoolConfig::new("recover", 1), registry())
        .await
        .unwrap();

    let outcome = pool
        .submit(command("square", json!("not a number")))
        .await
        .unwrap();
    assert!(!outcome.is_success());
    assert!(outcome
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("expected an integer"));

    // The only worker must still be alive and serving
    let outcome = pool.submit(command("square", json!(6))).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.value, Some(json!(36)));

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_panicking_handler_does_not_kill_worker() {
    let pool = WorkerPool::initialize(PoolConfig::new("panic", 1), registry())
        .await
        .unwrap();

    let outcome = pool.submit(command("explode", json!(null))).await.unwrap();
    assert!(!outcome.is_success());
    assert!(outcome
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("handler panicked"));

    // Same worker, next command
    let outcome = pool.submit(command("square", json!(6))).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.value, Some(json!(36)));

    let status = pool.status().await.unwrap();
    assert_eq!(status.busy, 0);

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_empty_tag_rejected_before_dispatch() {
    let pool = WorkerPool::initialize(PoolConfig::new("validation", 1), registry())
        .await
        .unwrap();

    let result = pool.submit(command("", json!(null))).await;
    assert!(matches!(result, Err(PoolError::Validation(_))));

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_deeply_nested_payload_rejected() {
    let pool = WorkerPool::initialize(PoolConfig::new("depth", 1), registry())
        .await
        .unwrap();

    let mut deep = json!(1);
    for _ in 0..40 {
        deep = json!([deep]);
    }

    let result = pool.submit(command("square", deep)).await;
    match result {
        Err(PoolError::Validation(message)) => assert!(message.contains("nested")),
        other => panic!("expected validation error, got {:?}", other),
    }

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_batch_mixes_success_and_failure_by_position() {
    let pool = WorkerPool::initialize(PoolConfig::new("mixed", 2), registry())
        .await
        .unwrap();

    let outcomes = pool
        .submit_all(vec![
            command("square", json!(3)),
            command("transmogrify", json!(null)),
            command("square", json!(5)),
        ])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].value, Some(json!(9)));
    assert!(!outcomes[1].is_success());
    assert_eq!(outcomes[2].value, Some(json!(25)));

    pool.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_null_payload_reaches_handler() {
    // Payloads cross the boundary as owned values; null is a legal payload
    let mut registry = HandlerRegistry::new();
    registry.register_fn("is_null", |payload| Ok(json!(payload.is_null())));

    let pool = WorkerPool::initialize(PoolConfig::new("null", 1), Arc::new(registry))
        .await
        .unwrap();

    let outcome = pool.submit(command("is_null", json!(null))).await.unwrap();
    assert_eq!(outcome.value, Some(json!(true)));

    pool.shutdown().await.unwrap();
}
