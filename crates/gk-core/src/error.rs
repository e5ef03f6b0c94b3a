//! Core error types for Gatekeeper

use gk_protocol::ProtocolError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the gatekeeper ecosystem
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] MiddlewareError),
}

/// Management connection errors
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// A command was issued before `start` bound a connection
    #[error("Middleware not started")]
    NotStarted,

    /// The management interface rejected our password
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The management connection is closed
    #[error("Connection closed")]
    Closed,

    /// Writing a command failed
    #[error("Write failed: {0}")]
    Write(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProtocolError> for ConnectionError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => Self::Io(e),
            other => Self::Write(other.to_string()),
        }
    }
}

/// Event stream ordering violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// An environment line arrived with no client/key id tracked
    #[error("Wrong auth state, no client id")]
    NoClientTracked,
}

/// Errors returned by a credentials checker
#[derive(Error, Debug)]
pub enum VerifierError {
    /// The identity service could not be reached
    #[error("Identity service unavailable: {0}")]
    Unavailable(String),

    /// The identity service answered with an unexpected status
    #[error("Unexpected status from identity service: {0}")]
    UnexpectedStatus(u16),

    /// The identity service answered with an unreadable body
    #[error("Invalid response from identity service: {0}")]
    InvalidResponse(String),

    /// The check did not finish in time
    #[error("Credential check timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Any other failure
    #[error("{0}")]
    Other(String),
}

/// Errors returned from `Middleware::consume_line`
#[derive(Error, Debug)]
pub enum MiddlewareError {
    /// The event stream is out of order
    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    /// A recognized line could not be parsed
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}
