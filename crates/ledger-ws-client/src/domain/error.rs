//! Error types for the client.
//!
//! Every failure that belongs to one call travels through that call's
//! outcome as a [`CallError`]. Failures that belong to no call (orphan and
//! malformed frames) never surface here; they go to logs, counters and the
//! diagnostics channel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category label of locally synthesised errors.
pub const LOCAL_ERROR_NAME: &str = "Client Error";

/// Code of locally synthesised errors.
pub const LOCAL_ERROR_CODE: i32 = -1;

/// Messages of locally synthesised errors.
pub mod messages {
    pub const TIMED_OUT: &str = "request timed out";
    pub const CONNECTION_CLOSED: &str = "connection closed";
    pub const CANCELLED: &str = "request cancelled";
    pub const SHUTDOWN: &str = "client shut down";
}

/// Structured command error, either reported by the node or synthesised
/// locally.
///
/// Deserialises straight from the response envelope, which carries these
/// fields next to `id` and `status`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Error)]
#[error("{name} {code} {message} {exception}")]
pub struct CommandError {
    #[serde(rename = "error", default)]
    pub name: String,
    #[serde(rename = "error_code", default)]
    pub code: i32,
    #[serde(rename = "error_message", default)]
    pub message: String,
    #[serde(rename = "error_exception", default)]
    pub exception: String,
}

impl CommandError {
    /// Local error with the fixed category and code.
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            name: LOCAL_ERROR_NAME.to_string(),
            code: LOCAL_ERROR_CODE,
            message: message.into(),
            exception: String::new(),
        }
    }
}

/// Outcome error of one call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The node answered with `status: "error"`.
    #[error("remote error: {0}")]
    Remote(CommandError),

    /// Synthesised on this side: timeout, cancellation, transport loss,
    /// encode or send failure.
    #[error("local error: {0}")]
    Local(CommandError),

    /// The result body did not have the shape expected for its command.
    #[error("cannot decode {command} result: {message}")]
    Decode {
        command: &'static str,
        message: String,
    },
}

impl CallError {
    pub fn local(message: impl Into<String>) -> Self {
        Self::Local(CommandError::local(message))
    }

    pub fn decode(command: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            command,
            message: err.to_string(),
        }
    }

    /// The structured error, for remote and local failures.
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            Self::Remote(e) | Self::Local(e) => Some(e),
            Self::Decode { .. } => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Local(e) if e.message == messages::TIMED_OUT)
    }
}

/// Result type for call outcomes
pub type CallResult<T> = Result<T, CallError>;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Client façade errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("no tokio runtime available to run background tasks")]
    NoRuntime,
}
