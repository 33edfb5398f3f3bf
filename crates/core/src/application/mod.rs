// Application Layer - Pool orchestration and worker execution

pub mod pool;
pub mod registry;
pub mod worker;

// Re-exports
pub use pool::{PoolConfig, WorkerPool};
pub use registry::HandlerRegistry;
pub use worker::{execute_guarded, PanicGuardResult};
