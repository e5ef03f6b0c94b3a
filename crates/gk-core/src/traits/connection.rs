//! Connection traits

use async_trait::async_trait;

use crate::error::ConnectionError;
use gk_protocol::Command;

/// Write side of a management connection
///
/// Implementations write one newline-terminated command per call and
/// flush before returning. A handle may be shared by several middlewares
/// on the same connection.
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Write a single command
    async fn send(&self, command: Command) -> Result<(), ConnectionError>;
}
