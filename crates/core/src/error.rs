// Central Error Type for the Pool

use thiserror::Error;

/// Pool-level error type
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Pool is closed")]
    Closed,

    #[error("Worker startup failed: {0}")]
    WorkerStartup(String),

    #[error("Pool torn down before the command completed")]
    TornDown,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using PoolError
pub type Result<T> = std::result::Result<T, PoolError>;
