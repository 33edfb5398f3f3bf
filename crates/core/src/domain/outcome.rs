// Outcome Domain Model

use crate::domain::command::CommandId;
use crate::domain::worker::WorkerId;
use serde::{Deserialize, Serialize};

/// Outcome status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Success,
    Failure,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "SUCCESS"),
            OutcomeStatus::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Tagged result of executing one command
///
/// Exactly one Outcome is produced per submitted Command. Execution
/// failures travel here as data, never as faults that could take a worker
/// or the pool down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub command_id: CommandId,
    pub worker: WorkerId,
    pub status: OutcomeStatus,
    pub value: Option<serde_json::Value>,
    pub error: Option<String>,
    pub duration_ms: i64,
}

impl Outcome {
    /// Successful execution with a result value
    pub fn success(
        command_id: CommandId,
        worker: WorkerId,
        value: serde_json::Value,
        duration_ms: i64,
    ) -> Self {
        Self {
            command_id,
            worker,
            status: OutcomeStatus::Success,
            value: Some(value),
            error: None,
            duration_ms,
        }
    }

    /// Failed execution with an error description
    pub fn failure(
        command_id: CommandId,
        worker: WorkerId,
        error: impl Into<String>,
        duration_ms: i64,
    ) -> Self {
        Self {
            command_id,
            worker,
            status: OutcomeStatus::Failure,
            value: None,
            error: Some(error.into()),
            duration_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Consume into the success value or the failure description
    pub fn into_result(self) -> std::result::Result<serde_json::Value, String> {
        match self.status {
            OutcomeStatus::Success => Ok(self.value.unwrap_or(serde_json::Value::Null)),
            OutcomeStatus::Failure => {
                Err(self.error.unwrap_or_else(|| "unknown failure".to_string()))
            }
        }
    }
}
