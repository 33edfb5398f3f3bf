//! Simple SDK Example
//!
//! Demonstrates basic usage of the Isopool SDK.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example simple
//! ```

use anyhow::Result;
use isopool_core::application::HandlerRegistry;
use isopool_core::port::HandlerError;
use isopool_sdk::{CallRequest, PoolClient, PoolClientConfig};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("isopool=info")),
        )
        .init();

    println!("Isopool SDK - Simple Example");
    println!("============================\n");

    // 1. Register handlers
    println!("1. Registering handlers...");
    let mut registry = HandlerRegistry::new();
    registry.register_fn("square", |payload| {
        let n = payload
            .as_i64()
            .ok_or_else(|| HandlerError::InvalidPayload("expected an integer".to_string()))?;
        Ok(json!(n * n))
    });
    registry.register_fn("uppercase", |payload| {
        let s = payload
            .as_str()
            .ok_or_else(|| HandlerError::InvalidPayload("expected a string".to_string()))?;
        Ok(json!(s.to_uppercase()))
    });
    println!("   ✓ {} handlers registered\n", registry.len());

    // 2. Start the pool
    println!("2. Starting a 2-worker pool...");
    let client = PoolClient::start(
        PoolClientConfig {
            name: "example".to_string(),
            pool_size: 2,
        },
        registry,
    )
    .await?;
    println!("   ✓ Pool ready\n");

    // 3. Single call
    println!("3. Calling 'square' with 7...");
    let squared = client.call("square", json!(7)).await?;
    println!("   ✓ Result: {}\n", squared);

    // 4. Batch call (responses stay in request order)
    println!("4. Submitting a batch...");
    let responses = client
        .call_batch(vec![
            CallRequest::new("square", json!(2)),
            CallRequest::new("square", json!(3)),
            CallRequest::new("uppercase", json!("isopool")),
            CallRequest::new("missing", json!(null)),
        ])
        .await?;

    for response in &responses {
        if response.success {
            println!(
                "   ✓ {} -> {} ({} ms)",
                response.command_id,
                response.value.clone().unwrap_or(json!(null)),
                response.duration_ms
            );
        } else {
            println!(
                "   ⚠ {} -> {}",
                response.command_id,
                response.error.clone().unwrap_or_default()
            );
        }
    }
    println!();

    // 5. Status and shutdown
    println!("5. Shutting down...");
    let status = client.status().await?;
    println!("   - state: {}", status.state);
    println!("   - busy workers: {}", status.busy);
    client.shutdown().await?;
    println!("   ✓ Pool closed");

    println!("\n✓ Example completed successfully!");

    Ok(())
}
