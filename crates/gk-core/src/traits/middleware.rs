//! Line consumer trait

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{ConnectionError, MiddlewareError};
use crate::traits::CommandSink;

/// A consumer of management-interface lines
///
/// The management session offers every inbound line to its middlewares in
/// order; the first one returning `Ok(true)` consumes it. Lines are
/// delivered one at a time from a single reader, so implementations hold
/// their state without locking.
#[async_trait]
pub trait Middleware: Send {
    /// Bind the connection and enable the notifications this middleware needs
    async fn start(&mut self, connection: Arc<dyn CommandSink>) -> Result<(), ConnectionError>;

    /// Disable notifications enabled by `start`
    ///
    /// Fails if the write fails. A middleware that writes on stop returns
    /// `ConnectionError::NotStarted` when `start` never bound a connection,
    /// since there is nothing to write to.
    async fn stop(&mut self) -> Result<(), ConnectionError>;

    /// Offer one line
    ///
    /// Returns `Ok(true)` if the line was recognized (whether or not a
    /// command was written), `Ok(false)` if it belongs to someone else.
    async fn consume_line(&mut self, line: &str) -> Result<bool, MiddlewareError>;
}
