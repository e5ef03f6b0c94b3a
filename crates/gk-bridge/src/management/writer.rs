//! Shared write half of a management connection

use std::sync::Arc;

use async_trait::async_trait;
use futures::SinkExt;
use tokio::io::AsyncWrite;
use tokio::sync::Mutex;
use tokio_util::codec::FramedWrite;

use gk_core::error::ConnectionError;
use gk_core::traits::CommandSink;
use gk_protocol::{Command, ManagementCodec};

type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Writes commands to the management interface
///
/// Cloning yields another handle to the same socket; each command is
/// written and flushed under the lock so lines never interleave.
#[derive(Clone)]
pub struct ManagementWriter {
    inner: Arc<Mutex<FramedWrite<BoxedWrite, ManagementCodec>>>,
}

impl ManagementWriter {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let boxed: BoxedWrite = Box::new(writer);
        Self {
            inner: Arc::new(Mutex::new(FramedWrite::new(boxed, ManagementCodec::new()))),
        }
    }
}

#[async_trait]
impl CommandSink for ManagementWriter {
    async fn send(&self, command: Command) -> Result<(), ConnectionError> {
        tracing::trace!("-> {:?}", command);
        let mut framed = self.inner.lock().await;
        framed.send(command).await.map_err(ConnectionError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gk_protocol::{ClientKey, DenyReason};
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_writes_newline_terminated_commands() {
        let (local, mut remote) = tokio::io::duplex(1024);
        let writer = ManagementWriter::new(local);

        writer.send(Command::StateOn).await.unwrap();
        writer
            .clone()
            .send(Command::ClientDeny {
                client: ClientKey::new(1, 0),
                reason: DenyReason::WrongCredentials,
            })
            .await
            .unwrap();
        drop(writer);

        let mut out = String::new();
        remote.read_to_string(&mut out).await.unwrap();
        assert_eq!(
            out,
            "state on\nclient-deny 1 0 wrong username or password\n"
        );
    }

    #[tokio::test]
    async fn test_write_to_closed_peer_fails() {
        let (local, remote) = tokio::io::duplex(64);
        drop(remote);
        let writer = ManagementWriter::new(local);

        assert!(writer.send(Command::StateOff).await.is_err());
    }
}
