// Command Domain Model

use serde::{Deserialize, Serialize};

/// Command ID (UUID v4, injected via IdProvider)
pub type CommandId = String;

/// Tag identifying the operation a worker should run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandTag(String);

impl CommandTag {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommandTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Command payload (JSON serializable)
///
/// Always an owned value: nothing borrowed crosses the worker boundary in
/// either direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandPayload(serde_json::Value);

impl CommandPayload {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// One unit of work submitted to the pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub tag: CommandTag,
    pub payload: CommandPayload,
    pub submitted_at: i64, // epoch ms
}

impl Command {
    /// Create a new Command
    ///
    /// # Arguments
    ///
    /// * `id` - Unique command ID (injected, not generated)
    /// * `submitted_at` - Submission timestamp in epoch ms (injected, not system time)
    /// * `tag` - Operation tag resolved by the worker
    /// * `payload` - Command payload
    pub fn new(
        id: impl Into<String>,
        submitted_at: i64,
        tag: CommandTag,
        payload: CommandPayload,
    ) -> Self {
        Self {
            id: id.into(),
            tag,
            payload,
            submitted_at,
        }
    }

    /// Create a test command with deterministic ID and timestamp.
    ///
    /// Uses a simple counter for deterministic test IDs (test-1, test-2, ...).
    /// Timestamps start at 1000 and increment by 1000.
    ///
    /// **Note**: This method should only be used in tests. For production code,
    /// always inject ID and time via providers.
    pub fn new_test(tag: CommandTag, payload: CommandPayload) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let id = format!("test-{}", counter);
        let submitted_at = (counter * 1000) as i64;

        Self::new(id, submitted_at, tag, payload)
    }
}
