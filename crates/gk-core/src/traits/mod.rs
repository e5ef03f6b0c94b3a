//! Core trait definitions

mod connection;
mod middleware;
mod verifier;

pub use connection::CommandSink;
pub use middleware::Middleware;
pub use verifier::CredentialsChecker;
