//! Domain types for the client.
//!
//! Call identity, the pending-call registry and handle, configuration and
//! error handling.

pub mod call_id;
pub mod config;
pub mod error;
pub mod handle;
pub mod pending;

// Re-exports for convenience
pub use call_id::{CallId, CallIdAllocator};
pub use config::ClientConfig;
pub use error::{messages, CallError, CallResult, ClientError, CommandError, ConfigError};
pub use handle::CallHandle;
pub use pending::{CallOutcome, CallStats, PendingCall, PendingCallStore, StatsSnapshot};
