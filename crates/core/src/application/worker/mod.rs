// Worker - command execution loop on a dedicated OS thread

pub mod constants;
mod panic_guard;

pub use panic_guard::{execute_guarded, PanicGuardResult};

use crate::application::pool::dispatcher::PoolMessage;
use crate::application::registry::HandlerRegistry;
use crate::domain::{Command, Outcome, WorkerId};
use crate::port::TimeProvider;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Messages a worker thread blocks on
pub(crate) enum WorkerMessage {
    Run(crate::application::pool::dispatcher::WorkOrder),
    Stop,
}

/// Everything a worker thread owns
///
/// Only owned or Arc-shared read-only data: a worker has no visibility into
/// the dispatcher's bookkeeping or into other workers.
pub(crate) struct WorkerContext {
    pub id: WorkerId,
    pub pool_name: String,
    pub registry: Arc<HandlerRegistry>,
    pub time_provider: Arc<dyn TimeProvider>,
    pub events: mpsc::UnboundedSender<PoolMessage>,
}

/// Worker thread entry point
///
/// Acknowledges startup, then serves one command at a time until told to
/// stop. After each command the worker reports itself idle so the
/// dispatcher can hand it the next queued caller.
pub(crate) fn run(
    ctx: WorkerContext,
    inbox: std::sync::mpsc::Receiver<WorkerMessage>,
    ready: oneshot::Sender<()>,
) {
    if ready.send(()).is_err() {
        // initialize() gave up on this pool before we came up
        debug!(worker = %ctx.id, pool = %ctx.pool_name, "Startup acknowledgement dropped, exiting");
        return;
    }

    info!(worker = %ctx.id, pool = %ctx.pool_name, "Worker started");

    while let Ok(message) = inbox.recv() {
        match message {
            WorkerMessage::Run(order) => {
                let outcome = execute_command(&ctx, &order.command);
                // Release the worker before waking the caller: a status
                // query issued right after the reply must not observe a
                // stale busy slot.
                let disconnected = ctx.events.send(PoolMessage::WorkerIdle(ctx.id)).is_err();
                // The caller may have given up waiting; send is best-effort
                let _ = order.reply.send(Ok(outcome));
                if disconnected {
                    debug!(worker = %ctx.id, pool = %ctx.pool_name, "Dispatcher gone, exiting");
                    break;
                }
            }
            WorkerMessage::Stop => break,
        }
    }

    info!(worker = %ctx.id, pool = %ctx.pool_name, "Worker stopped");
}

/// Resolve the command tag and run its handler with panic isolation
fn execute_command(ctx: &WorkerContext, command: &Command) -> Outcome {
    let started = ctx.time_provider.now_millis();
    let tag = command.tag.as_str();

    let handler = match ctx.registry.get(tag) {
        Some(handler) => handler,
        None => {
            warn!(worker = %ctx.id, command_id = %command.id, tag = %tag, "Unknown command");
            return Outcome::failure(
                command.id.clone(),
                ctx.id,
                format!("unknown command: {}", tag),
                ctx.time_provider.now_millis() - started,
            );
        }
    };

    debug!(worker = %ctx.id, command_id = %command.id, tag = %tag, "Executing command");

    let result = execute_guarded(|| handler.call(command.payload.as_value()));
    let duration_ms = ctx.time_provider.now_millis() - started;

    match result {
        PanicGuardResult::Success(Ok(value)) => {
            info!(
                worker = %ctx.id,
                command_id = %command.id,
                duration_ms = %duration_ms,
                "Command completed"
            );
            Outcome::success(command.id.clone(), ctx.id, value, duration_ms)
        }
        PanicGuardResult::Success(Err(e)) => {
            error!(
                worker = %ctx.id,
                command_id = %command.id,
                error = %e,
                "Command failed"
            );
            Outcome::failure(command.id.clone(), ctx.id, e.to_string(), duration_ms)
        }
        PanicGuardResult::Panicked(panic_msg) => {
            error!(
                worker = %ctx.id,
                command_id = %command.id,
                panic_msg = %panic_msg,
                "Command handler panicked"
            );
            Outcome::failure(
                command.id.clone(),
                ctx.id,
                format!("handler panicked: {}", panic_msg),
                duration_ms,
            )
        }
    }
}
