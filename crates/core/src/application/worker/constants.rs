// Worker and pool constants (no magic values)
use std::time::Duration;

/// Default number of workers when none is configured
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Upper bound on configured pool size
pub const MAX_POOL_SIZE: usize = 256;

/// How long initialize() waits for each worker startup acknowledgement
pub const STARTUP_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum command tag length in bytes
pub const MAX_TAG_LENGTH: usize = 64;

/// Maximum nesting depth accepted for command payloads
pub const MAX_PAYLOAD_DEPTH: usize = 32;
