// Worker Pool - bounded dispatch of commands to isolated workers

pub(crate) mod dispatcher;

use crate::application::registry::HandlerRegistry;
use crate::application::worker::constants::{
    DEFAULT_POOL_SIZE, MAX_PAYLOAD_DEPTH, MAX_POOL_SIZE, MAX_TAG_LENGTH, STARTUP_ACK_TIMEOUT,
};
use crate::application::worker::{self, WorkerContext, WorkerMessage};
use crate::domain::{Command, Outcome, PoolLifecycle, PoolStatus, WorkerId};
use crate::error::{PoolError, Result};
use crate::port::time_provider::SystemTimeProvider;
use crate::port::TimeProvider;
use dispatcher::{Dispatcher, PoolMessage, WorkOrder, WorkerSlot};
use futures::future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Pool name (used in logs and worker thread names)
    pub name: String,
    /// Fixed number of workers spawned at initialization
    pub size: usize,
}

impl PoolConfig {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            size: DEFAULT_POOL_SIZE,
        }
    }
}

/// Fixed-size worker pool with FIFO caller queueing
///
/// Workers are spawned once at initialization and destroyed only at
/// shutdown. Each worker runs on its own OS thread with no shared mutable
/// state; the pool handle itself is just a sender into the dispatcher's
/// serialized control path.
pub struct WorkerPool {
    name: String,
    size: usize,
    control: mpsc::UnboundedSender<PoolMessage>,
}

impl WorkerPool {
    /// Spawn `config.size` workers and wait for every startup acknowledgement
    ///
    /// # Errors
    /// - PoolError::Validation if the size is 0 or above MAX_POOL_SIZE
    /// - PoolError::WorkerStartup if any worker fails to start in time
    ///   (already-spawned workers are stopped before returning)
    pub async fn initialize(config: PoolConfig, registry: Arc<HandlerRegistry>) -> Result<Self> {
        Self::initialize_with_time(config, registry, Arc::new(SystemTimeProvider)).await
    }

    /// Initialize with an injected time provider (deterministic tests)
    pub async fn initialize_with_time(
        config: PoolConfig,
        registry: Arc<HandlerRegistry>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        if config.size == 0 {
            return Err(PoolError::Validation(
                "pool size must be at least 1".to_string(),
            ));
        }
        if config.size > MAX_POOL_SIZE {
            return Err(PoolError::Validation(format!(
                "pool size {} exceeds maximum {}",
                config.size, MAX_POOL_SIZE
            )));
        }

        info!(
            pool = %config.name,
            size = %config.size,
            handlers = %registry.len(),
            "Initializing worker pool"
        );

        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let mut slots: Vec<WorkerSlot> = Vec::with_capacity(config.size);
        let mut acks = Vec::with_capacity(config.size);

        for index in 0..config.size {
            let id = WorkerId(index);
            let (work_tx, work_rx) = std::sync::mpsc::channel();
            let (ready_tx, ready_rx) = oneshot::channel();

            let context = WorkerContext {
                id,
                pool_name: config.name.clone(),
                registry: Arc::clone(&registry),
                time_provider: Arc::clone(&time_provider),
                events: control_tx.clone(),
            };

            let spawned = std::thread::Builder::new()
                .name(format!("{}-worker-{}", config.name, index))
                .spawn(move || worker::run(context, work_rx, ready_tx));

            match spawned {
                Ok(join) => {
                    slots.push(WorkerSlot::new(id, work_tx, join));
                    acks.push((id, ready_rx));
                }
                Err(e) => {
                    halt_slots(&slots);
                    return Err(PoolError::WorkerStartup(format!(
                        "{}: spawn failed: {}",
                        id, e
                    )));
                }
            }
        }

        // Ready only once every worker acknowledged startup
        for (id, ready_rx) in acks {
            match tokio::time::timeout(STARTUP_ACK_TIMEOUT, ready_rx).await {
                Ok(Ok(())) => debug!(worker = %id, pool = %config.name, "Worker acknowledged startup"),
                Ok(Err(_)) => {
                    halt_slots(&slots);
                    return Err(PoolError::WorkerStartup(format!(
                        "{} terminated during startup",
                        id
                    )));
                }
                Err(_) => {
                    halt_slots(&slots);
                    return Err(PoolError::WorkerStartup(format!(
                        "{} did not acknowledge startup within {:?}",
                        id, STARTUP_ACK_TIMEOUT
                    )));
                }
            }
        }

        let mut lifecycle = PoolLifecycle::new();
        lifecycle.mark_ready()?;

        tokio::spawn(Dispatcher::new(config.name.clone(), lifecycle, slots, control_rx).run());

        info!(pool = %config.name, size = %config.size, "Worker pool ready");

        Ok(Self {
            name: config.name,
            size: config.size,
            control: control_tx,
        })
    }

    /// Submit one command; suspends until a worker produced its outcome
    ///
    /// Only the calling task suspends. Execution failures (unknown tag,
    /// handler error, handler panic) come back as failure Outcomes, not as
    /// Err.
    pub async fn submit(&self, command: Command) -> Result<Outcome> {
        validate_command(&command)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        let order = WorkOrder {
            command,
            reply: reply_tx,
        };

        self.control
            .send(PoolMessage::Submit(order))
            .map_err(|_| PoolError::Closed)?;

        reply_rx.await.map_err(|_| PoolError::TornDown)?
    }

    /// Submit a batch concurrently; outcome i corresponds to command i
    ///
    /// Queue admission follows input order, but completion order is up to
    /// the workers. Positions are preserved regardless.
    pub async fn submit_all(&self, commands: Vec<Command>) -> Result<Vec<Outcome>> {
        let submissions: Vec<_> = commands
            .into_iter()
            .map(|command| self.submit(command))
            .collect();
        future::join_all(submissions).await.into_iter().collect()
    }

    /// Current occupancy snapshot
    pub async fn status(&self) -> Result<PoolStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.control
            .send(PoolMessage::Status(reply_tx))
            .map_err(|_| PoolError::Closed)?;
        reply_rx.await.map_err(|_| PoolError::TornDown)
    }

    /// Drain the queue, stop every worker, transition to Closed
    ///
    /// Safe to call more than once; every caller resolves once the pool is
    /// closed.
    pub async fn shutdown(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .control
            .send(PoolMessage::Shutdown(reply_tx))
            .is_err()
        {
            // Dispatcher already exited; the pool is closed
            return Ok(());
        }
        reply_rx.await.map_err(|_| PoolError::TornDown)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Cooperative teardown: queued callers get a shutdown error and the
        // worker threads are reaped by the dispatcher task.
        let _ = self.control.send(PoolMessage::Teardown);
    }
}

/// Reject commands the workers could never route sensibly
fn validate_command(command: &Command) -> Result<()> {
    let tag = command.tag.as_str();
    if tag.is_empty() {
        return Err(PoolError::Validation(
            "command tag must not be empty".to_string(),
        ));
    }
    if tag.len() > MAX_TAG_LENGTH {
        return Err(PoolError::Validation(format!(
            "command tag too long ({} > {} bytes)",
            tag.len(),
            MAX_TAG_LENGTH
        )));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
    {
        return Err(PoolError::Validation(
            "command tag must be alphanumeric with '_', '-', '.' or ':'".to_string(),
        ));
    }
    if payload_depth(command.payload.as_value()) > MAX_PAYLOAD_DEPTH {
        return Err(PoolError::Validation(
            "command payload too deeply nested".to_string(),
        ));
    }
    Ok(())
}

fn payload_depth(value: &serde_json::Value) -> usize {
    match value {
        serde_json::Value::Array(items) => {
            1 + items.iter().map(payload_depth).max().unwrap_or(0)
        }
        serde_json::Value::Object(map) => {
            1 + map.values().map(payload_depth).max().unwrap_or(0)
        }
        _ => 0,
    }
}

fn halt_slots(slots: &[WorkerSlot]) {
    for slot in slots {
        let _ = slot.sender().send(WorkerMessage::Stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommandPayload, CommandTag};
    use serde_json::json;

    fn command(tag: &str, payload: serde_json::Value) -> Command {
        Command::new_test(CommandTag::new(tag), CommandPayload::new(payload))
    }

    #[test]
    fn test_validate_empty_tag() {
        let result = validate_command(&command("", json!(null)));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_tag_too_long() {
        let result = validate_command(&command(&"a".repeat(MAX_TAG_LENGTH + 1), json!(null)));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too long"));
    }

    #[test]
    fn test_validate_tag_invalid_chars() {
        let result = validate_command(&command("not a tag!", json!(null)));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("alphanumeric"));
    }

    #[test]
    fn test_validate_payload_depth() {
        let mut deep = json!({"level": 0});
        for i in 1..=MAX_PAYLOAD_DEPTH + 3 {
            deep = json!({"level": i, "nested": deep});
        }

        let result = validate_command(&command("deep", deep));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("nested"));
    }

    #[test]
    fn test_validate_valid_command() {
        let result = validate_command(&command("batch.square-v1", json!({"n": 3})));
        assert!(result.is_ok());
    }
}
