//! # Error Types
//!
//! Errors raised while parsing ledger values from their wire text.

use thiserror::Error;

/// Errors that can occur while decoding a ledger model value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Text was not valid hexadecimal.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded bytes had the wrong length.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Account address text failed validation.
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    /// Currency code was neither a 3-character code nor 40 hex digits.
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    /// Decimal value text could not be parsed.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Native amount was not an integer number of drops.
    #[error("Invalid drops: {0}")]
    InvalidDrops(String),

    /// Discriminator field absent or not a string.
    #[error("Missing discriminator field {0}")]
    MissingDiscriminator(&'static str),

    /// A payload could not be decoded into the shape selected for it.
    #[error("Cannot decode {kind}: {message}")]
    Body { kind: String, message: String },
}

impl ModelError {
    pub(crate) fn body(kind: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Body {
            kind: kind.into(),
            message: err.to_string(),
        }
    }
}
