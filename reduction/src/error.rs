//! Error types for reduction operations.

use thiserror::Error;

/// Errors that can occur during clipping, mode estimation, collapse and overscan computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A required input is absent or empty.
    #[error("Null input: {0}")]
    NullInput(String),

    /// Two inputs that must agree (lengths, shapes, axes) do not.
    #[error("Incompatible input: {0}")]
    IncompatibleInput(String),

    /// A value lies outside its valid domain.
    #[error("Illegal input: {0}")]
    IllegalInput(String),

    /// A computed result is not finite.
    #[error("Illegal output: {0}")]
    IllegalOutput(String),

    /// An algorithm or method selector has no implementation.
    #[error("Unsupported mode: {0}")]
    UnsupportedMode(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn null(msg: impl Into<String>) -> Self {
        Self::NullInput(msg.into())
    }

    pub(crate) fn incompatible(msg: impl Into<String>) -> Self {
        Self::IncompatibleInput(msg.into())
    }

    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        Self::IllegalInput(msg.into())
    }

    pub(crate) fn illegal_output(msg: impl Into<String>) -> Self {
        Self::IllegalOutput(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedMode(msg.into())
    }
}
