//! Pool Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{CallRequest, CallResponse};
use isopool_core::application::worker::constants::DEFAULT_POOL_SIZE;
use isopool_core::application::{HandlerRegistry, PoolConfig, WorkerPool};
use isopool_core::domain::{Command, CommandPayload, CommandTag, PoolStatus};
use isopool_core::port::id_provider::UuidProvider;
use isopool_core::port::time_provider::SystemTimeProvider;
use isopool_core::port::{IdProvider, TimeProvider};
use std::sync::Arc;

/// Client configuration
#[derive(Debug, Clone)]
pub struct PoolClientConfig {
    /// Pool name used in logs and worker thread names
    pub name: String,
    /// Number of workers to spawn
    pub pool_size: usize,
}

impl Default for PoolClientConfig {
    fn default() -> Self {
        Self {
            name: "isopool".to_string(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

/// Isopool Client
///
/// Owns a worker pool and provides a typed call surface over it. The client
/// holds no state beyond the pool handle and the providers it builds
/// Commands with.
///
/// # Example
///
/// ```no_run
/// use isopool_core::application::HandlerRegistry;
/// use isopool_sdk::{PoolClient, PoolClientConfig};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = HandlerRegistry::new();
/// let client = PoolClient::start(PoolClientConfig::default(), registry).await?;
/// client.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct PoolClient {
    pool: WorkerPool,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl PoolClient {
    /// Start a pool serving the given handler registry
    ///
    /// # Arguments
    ///
    /// * `config` - Pool name and size
    /// * `registry` - Handlers keyed by command tag, registered up front
    pub async fn start(config: PoolClientConfig, registry: HandlerRegistry) -> Result<Self> {
        Self::start_with_providers(
            config,
            registry,
            Arc::new(UuidProvider),
            Arc::new(SystemTimeProvider),
        )
        .await
    }

    /// Start with injected id/time providers (deterministic tests)
    pub async fn start_with_providers(
        config: PoolClientConfig,
        registry: HandlerRegistry,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        let pool_config = PoolConfig::new(config.name, config.pool_size);
        let pool = WorkerPool::initialize_with_time(
            pool_config,
            Arc::new(registry),
            Arc::clone(&time_provider),
        )
        .await?;

        Ok(Self {
            pool,
            id_provider,
            time_provider,
        })
    }

    /// Run one command and return its success value
    ///
    /// Failure outcomes (unknown tag, handler error, handler panic) surface
    /// as SdkError::Command.
    pub async fn call(
        &self,
        command: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let command = self.build_command(command.into(), payload);
        let outcome = self.pool.submit(command).await?;
        outcome.into_result().map_err(SdkError::Command)
    }

    /// Run a batch concurrently; response i corresponds to request i
    ///
    /// Unlike [`call`](Self::call), per-command failures stay inside the
    /// responses so one bad request cannot mask the rest of the batch.
    pub async fn call_batch(&self, requests: Vec<CallRequest>) -> Result<Vec<CallResponse>> {
        let commands = requests
            .into_iter()
            .map(|request| self.build_command(request.command, request.payload))
            .collect();

        let outcomes = self.pool.submit_all(commands).await?;
        Ok(outcomes.into_iter().map(CallResponse::from).collect())
    }

    /// Pool occupancy snapshot
    pub async fn status(&self) -> Result<PoolStatus> {
        Ok(self.pool.status().await?)
    }

    /// Drain outstanding work and close the pool
    pub async fn shutdown(&self) -> Result<()> {
        Ok(self.pool.shutdown().await?)
    }

    fn build_command(&self, tag: String, payload: serde_json::Value) -> Command {
        Command::new(
            self.id_provider.generate_id(),
            self.time_provider.now_millis(),
            CommandTag::new(tag),
            CommandPayload::new(payload),
        )
    }
}
