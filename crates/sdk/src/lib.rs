//! Isopool SDK - Caller Surface
//!
//! Thin façade over the worker pool: constructs well-formed Commands,
//! submits them, and interprets Outcomes. Domain handlers live in the
//! HandlerRegistry, so adding a new command tag never touches this crate.
//!
//! # Example
//!
//! ```no_run
//! use isopool_core::application::HandlerRegistry;
//! use isopool_core::port::HandlerError;
//! use isopool_sdk::{PoolClient, PoolClientConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut registry = HandlerRegistry::new();
//!     registry.register_fn("square", |payload| {
//!         let n = payload
//!             .as_i64()
//!             .ok_or_else(|| HandlerError::InvalidPayload("expected an integer".to_string()))?;
//!         Ok(json!(n * n))
//!     });
//!
//!     let client = PoolClient::start(PoolClientConfig::default(), registry).await?;
//!
//!     let squared = client.call("square", json!(7)).await?;
//!     assert_eq!(squared, json!(49));
//!
//!     client.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{PoolClient, PoolClientConfig};
pub use error::{Result, SdkError};
pub use types::{CallRequest, CallResponse};
