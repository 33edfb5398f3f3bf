// Pool Lifecycle Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Pool state machine: Initializing -> Ready -> Draining -> Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolState {
    Initializing,
    Ready,
    Draining,
    Closed,
}

impl std::fmt::Display for PoolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolState::Initializing => write!(f, "INITIALIZING"),
            PoolState::Ready => write!(f, "READY"),
            PoolState::Draining => write!(f, "DRAINING"),
            PoolState::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Validated transitions for the pool state machine
#[derive(Debug)]
pub struct PoolLifecycle {
    state: PoolState,
}

impl PoolLifecycle {
    pub fn new() -> Self {
        Self {
            state: PoolState::Initializing,
        }
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    /// New submissions are only accepted while Ready
    pub fn accepts_submissions(&self) -> bool {
        self.state == PoolState::Ready
    }

    /// Transition to Ready once every worker acknowledged startup
    pub fn mark_ready(&mut self) -> Result<()> {
        if self.state != PoolState::Initializing {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: "READY".to_string(),
            });
        }
        self.state = PoolState::Ready;
        Ok(())
    }

    /// Transition to Draining; queued work still runs, new work is refused
    pub fn begin_drain(&mut self) -> Result<()> {
        if self.state != PoolState::Ready {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: "DRAINING".to_string(),
            });
        }
        self.state = PoolState::Draining;
        Ok(())
    }

    /// Transition to Closed once nothing is in flight or queued
    pub fn mark_closed(&mut self) -> Result<()> {
        if self.state != PoolState::Draining {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: "CLOSED".to_string(),
            });
        }
        self.state = PoolState::Closed;
        Ok(())
    }
}

impl Default for PoolLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time pool occupancy snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    pub state: PoolState,
    pub size: usize,
    pub busy: usize,
    pub idle: usize,
    pub queued: usize,
}
