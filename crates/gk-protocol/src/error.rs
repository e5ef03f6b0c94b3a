//! Protocol error types

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A client or key id did not fit the id type
    #[error("Invalid {kind} id: {value}")]
    InvalidId { kind: &'static str, value: String },

    /// A line pattern failed to compile
    #[error("Invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Line exceeds the configured maximum length
    #[error("Line too long: {size} bytes exceeds maximum of {max} bytes")]
    LineTooLong { size: usize, max: usize },

    /// Line is not valid UTF-8
    #[error("Line is not valid UTF-8")]
    InvalidUtf8,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
