// Port Layer - Interfaces for pluggable dependencies

pub mod handler;
pub mod id_provider; // For deterministic testing
pub mod time_provider;

// Re-exports
pub use handler::{CommandHandler, HandlerError};
pub use id_provider::IdProvider;
pub use time_provider::TimeProvider;
