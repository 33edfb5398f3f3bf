// Command Handler Port
// Abstraction for the pure functions a worker routes command tags to

use thiserror::Error;

/// Handler errors
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Handler failed: {0}")]
    Failed(String),
}

/// Command handler trait
///
/// Handlers receive a borrowed view of the payload and return an owned
/// value; nothing they borrow outlives the call, so no references leak
/// across the worker boundary. A handler error is recovered into a failure
/// Outcome and never terminates the worker.
pub trait CommandHandler: Send + Sync {
    /// Execute the handler against a command payload
    ///
    /// # Errors
    /// - HandlerError::InvalidPayload if the payload is malformed
    /// - HandlerError::Failed for any failure during execution
    fn call(&self, payload: &serde_json::Value)
        -> std::result::Result<serde_json::Value, HandlerError>;
}

impl<F> CommandHandler for F
where
    F: Fn(&serde_json::Value) -> std::result::Result<serde_json::Value, HandlerError>
        + Send
        + Sync,
{
    fn call(
        &self,
        payload: &serde_json::Value,
    ) -> std::result::Result<serde_json::Value, HandlerError> {
        self(payload)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock handler behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Echo the payload back
        Echo,
        /// Always fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
        /// Sleep for N ms, then echo (for queueing and concurrency testing)
        Sleep(u64),
    }

    /// Mock command handler for testing
    pub struct MockHandler {
        behavior: MockBehavior,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockHandler {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_echo() -> Self {
            Self::new(MockBehavior::Echo)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn new_sleeping(millis: u64) -> Self {
            Self::new(MockBehavior::Sleep(millis))
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    impl CommandHandler for MockHandler {
        fn call(
            &self,
            payload: &serde_json::Value,
        ) -> std::result::Result<serde_json::Value, HandlerError> {
            *self.call_count.lock().unwrap() += 1;

            match &self.behavior {
                MockBehavior::Echo => Ok(payload.clone()),
                MockBehavior::Fail(msg) => Err(HandlerError::Failed(msg.clone())),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
                MockBehavior::Sleep(millis) => {
                    std::thread::sleep(Duration::from_millis(*millis));
                    Ok(payload.clone())
                }
            }
        }
    }
}
