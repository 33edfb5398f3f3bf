// Dispatcher - the pool's serialized control path
//
// All free/busy bookkeeping and the FIFO pending queue live in this one
// task. Assignment and release are the only mutation points, so the pool
// needs no locks anywhere.

use crate::application::worker::WorkerMessage;
use crate::domain::{Command, Outcome, PoolLifecycle, PoolState, PoolStatus, WorkerId, WorkerState};
use crate::error::{PoolError, Result};
use std::collections::VecDeque;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// One submitted command plus the channel its outcome is delivered on
pub(crate) struct WorkOrder {
    pub command: Command,
    pub reply: oneshot::Sender<Result<Outcome>>,
}

/// Everything the dispatcher can be asked to do
pub(crate) enum PoolMessage {
    Submit(WorkOrder),
    WorkerIdle(WorkerId),
    Status(oneshot::Sender<PoolStatus>),
    Shutdown(oneshot::Sender<()>),
    Teardown,
}

/// A worker as the dispatcher sees it: an id, a state and a sender
pub(crate) struct WorkerSlot {
    pub id: WorkerId,
    pub state: WorkerState,
    sender: std::sync::mpsc::Sender<WorkerMessage>,
    join: Option<JoinHandle<()>>,
}

impl WorkerSlot {
    pub fn new(
        id: WorkerId,
        sender: std::sync::mpsc::Sender<WorkerMessage>,
        join: JoinHandle<()>,
    ) -> Self {
        Self {
            id,
            state: WorkerState::Free,
            sender,
            join: Some(join),
        }
    }

    pub fn sender(&self) -> &std::sync::mpsc::Sender<WorkerMessage> {
        &self.sender
    }
}

pub(crate) struct Dispatcher {
    pool_name: String,
    lifecycle: PoolLifecycle,
    slots: Vec<WorkerSlot>,
    free: VecDeque<WorkerId>,
    pending: VecDeque<WorkOrder>,
    inbox: mpsc::UnboundedReceiver<PoolMessage>,
    shutdown_waiters: Vec<oneshot::Sender<()>>,
}

impl Dispatcher {
    pub fn new(
        pool_name: String,
        lifecycle: PoolLifecycle,
        slots: Vec<WorkerSlot>,
        inbox: mpsc::UnboundedReceiver<PoolMessage>,
    ) -> Self {
        let free = slots.iter().map(|slot| slot.id).collect();
        Self {
            pool_name,
            lifecycle,
            slots,
            free,
            pending: VecDeque::new(),
            inbox,
            shutdown_waiters: Vec::new(),
        }
    }

    /// Serialized control loop; returns once the pool reaches Closed
    pub async fn run(mut self) {
        while let Some(message) = self.inbox.recv().await {
            match message {
                PoolMessage::Submit(order) => self.handle_submit(order),
                PoolMessage::WorkerIdle(id) => self.handle_idle(id),
                PoolMessage::Status(reply) => {
                    let _ = reply.send(self.status());
                }
                PoolMessage::Shutdown(reply) => self.handle_shutdown(reply),
                PoolMessage::Teardown => self.handle_teardown(),
            }

            if self.lifecycle.state() == PoolState::Closed {
                break;
            }
        }

        self.drain_inbox();
        self.reap_workers();
        info!(pool = %self.pool_name, "Dispatcher stopped");
    }

    /// Answer messages that raced with the close before the inbox drops
    ///
    /// close() refuses further sends, so anything still buffered here is the
    /// last traffic this pool will ever see.
    fn drain_inbox(&mut self) {
        self.inbox.close();
        while let Ok(message) = self.inbox.try_recv() {
            match message {
                PoolMessage::Submit(order) => {
                    let _ = order.reply.send(Err(PoolError::Closed));
                }
                PoolMessage::WorkerIdle(id) => {
                    self.slots[id.index()].state = WorkerState::Free;
                }
                PoolMessage::Status(reply) => {
                    let _ = reply.send(self.status());
                }
                PoolMessage::Shutdown(reply) => {
                    let _ = reply.send(());
                }
                PoolMessage::Teardown => {}
            }
        }
    }

    fn handle_submit(&mut self, order: WorkOrder) {
        if !self.lifecycle.accepts_submissions() {
            debug!(
                pool = %self.pool_name,
                command_id = %order.command.id,
                state = %self.lifecycle.state(),
                "Submission rejected, pool not accepting work"
            );
            let _ = order.reply.send(Err(PoolError::Closed));
            return;
        }

        match self.free.pop_front() {
            Some(id) => self.assign(id, order),
            None => {
                debug!(
                    pool = %self.pool_name,
                    command_id = %order.command.id,
                    queued = %(self.pending.len() + 1),
                    "All workers busy, caller queued"
                );
                self.pending.push_back(order);
            }
        }
    }

    /// Hand one order to one free worker
    fn assign(&mut self, id: WorkerId, order: WorkOrder) {
        let slot = &mut self.slots[id.index()];
        debug_assert_eq!(slot.state, WorkerState::Free);
        slot.state = WorkerState::Busy;

        debug!(
            pool = %self.pool_name,
            worker = %id,
            command_id = %order.command.id,
            "Command assigned"
        );

        if let Err(std::sync::mpsc::SendError(message)) =
            slot.sender.send(WorkerMessage::Run(order))
        {
            // Worker threads only exit when told to stop, so this is a bug
            // if it ever fires. The slot can never report idle again and
            // stays out of the free set.
            error!(pool = %self.pool_name, worker = %id, "Worker unavailable, failing command");
            if let WorkerMessage::Run(order) = message {
                let _ = order
                    .reply
                    .send(Err(PoolError::Internal(format!("{} unavailable", id))));
            }
        }
    }

    /// A worker finished its command and can take the next queued caller
    fn handle_idle(&mut self, id: WorkerId) {
        self.slots[id.index()].state = WorkerState::Free;

        if let Some(order) = self.pending.pop_front() {
            // FIFO: the longest-waiting caller gets the worker that just
            // freed up, before anyone newly submitting can claim it.
            self.assign(id, order);
        } else {
            self.free.push_back(id);
            self.maybe_finish_drain();
        }
    }

    fn handle_shutdown(&mut self, reply: oneshot::Sender<()>) {
        match self.lifecycle.state() {
            PoolState::Ready => {
                info!(
                    pool = %self.pool_name,
                    pending = %self.pending.len(),
                    "Draining worker pool"
                );
                if let Err(e) = self.lifecycle.begin_drain() {
                    // Unreachable from Ready; logged so a broken state
                    // machine cannot fail silently
                    error!(pool = %self.pool_name, error = %e, "Drain transition rejected");
                }
                self.shutdown_waiters.push(reply);
                self.maybe_finish_drain();
            }
            PoolState::Draining | PoolState::Initializing => {
                self.shutdown_waiters.push(reply);
            }
            PoolState::Closed => {
                let _ = reply.send(());
            }
        }
    }

    /// Close once draining and nothing is in flight or queued
    fn maybe_finish_drain(&mut self) {
        if self.lifecycle.state() != PoolState::Draining {
            return;
        }
        if self.busy_count() > 0 || !self.pending.is_empty() {
            return;
        }

        self.stop_workers();
        if let Err(e) = self.lifecycle.mark_closed() {
            error!(pool = %self.pool_name, error = %e, "Close transition rejected");
        }
        info!(pool = %self.pool_name, "Worker pool closed");

        for waiter in self.shutdown_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    /// Teardown without drain: fail queued callers, stop workers cooperatively
    ///
    /// In-flight commands still finish (shutdown is never forcible); their
    /// workers see the stop message right after.
    fn handle_teardown(&mut self) {
        if self.lifecycle.state() == PoolState::Closed {
            return;
        }

        if !self.pending.is_empty() {
            warn!(
                pool = %self.pool_name,
                pending = %self.pending.len(),
                "Pool torn down with queued commands"
            );
        }
        for order in self.pending.drain(..) {
            let _ = order.reply.send(Err(PoolError::Closed));
        }

        self.stop_workers();

        // Force the state machine to its terminal state
        let _ = self.lifecycle.begin_drain();
        let _ = self.lifecycle.mark_closed();

        for waiter in self.shutdown_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    fn stop_workers(&mut self) {
        for slot in &self.slots {
            if slot.sender.send(WorkerMessage::Stop).is_err() {
                debug!(pool = %self.pool_name, worker = %slot.id, "Worker already stopped");
            }
        }
    }

    /// Reap worker threads off the async runtime
    ///
    /// Every worker has a stop message queued by now; a busy worker joins
    /// as soon as its in-flight command finishes.
    fn reap_workers(&mut self) {
        let pool_name = self.pool_name.clone();
        let slots = std::mem::take(&mut self.slots);
        tokio::task::spawn_blocking(move || {
            for mut slot in slots {
                if let Some(join) = slot.join.take() {
                    if join.join().is_err() {
                        error!(pool = %pool_name, worker = %slot.id, "Worker thread panicked");
                    }
                }
            }
        });
    }

    fn busy_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state == WorkerState::Busy)
            .count()
    }

    fn status(&self) -> PoolStatus {
        let busy = self.busy_count();
        PoolStatus {
            state: self.lifecycle.state(),
            size: self.slots.len(),
            busy,
            idle: self.slots.len() - busy,
            queued: self.pending.len(),
        }
    }
}
