//! gk-core: Core abstractions and configuration for Gatekeeper
//!
//! This crate provides the error taxonomy, configuration structures and
//! collaborator traits shared by the management-channel bridge and its
//! credential checkers.

pub mod config;
pub mod error;
pub mod traits;

pub use error::{
    ConnectionError, GatekeeperError, MiddlewareError, SequenceError, VerifierError,
};
pub use traits::{CommandSink, CredentialsChecker, Middleware};
