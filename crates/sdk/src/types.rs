//! SDK Request/Response Types

use isopool_core::domain::Outcome;
use serde::{Deserialize, Serialize};

/// One unit of work in a batch call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    pub command: String,
    pub payload: serde_json::Value,
}

impl CallRequest {
    pub fn new(command: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            command: command.into(),
            payload,
        }
    }
}

/// Interpreted outcome of one call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResponse {
    pub command_id: String,
    pub success: bool,
    pub value: Option<serde_json::Value>,
    pub error: Option<String>,
    pub duration_ms: i64,
}

impl From<Outcome> for CallResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            command_id: outcome.command_id.clone(),
            success: outcome.is_success(),
            value: outcome.value,
            error: outcome.error,
            duration_ms: outcome.duration_ms,
        }
    }
}
