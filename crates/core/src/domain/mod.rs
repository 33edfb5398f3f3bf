// Domain Layer - Commands, Outcomes and the Pool Lifecycle

pub mod command;
pub mod error;
pub mod outcome;
pub mod pool;
pub mod worker;

pub use command::{Command, CommandId, CommandPayload, CommandTag};
pub use error::DomainError;
pub use outcome::{Outcome, OutcomeStatus};
pub use pool::{PoolLifecycle, PoolState, PoolStatus};
pub use worker::{WorkerId, WorkerState};
