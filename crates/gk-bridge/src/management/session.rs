//! One management connection
//!
//! Reads the daemon's output line by line and offers each line to the
//! middlewares in registration order until one consumes it.

use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;

use gk_core::error::{ConnectionError, GatekeeperError};
use gk_core::traits::{CommandSink, Middleware};
use gk_protocol::{Command, ManagementCodec, DEFAULT_MAX_LINE_LENGTH, PASSWORD_PROMPT};

use super::writer::ManagementWriter;

/// Runs the line loop for one management connection at a time
pub struct ManagementSession {
    middlewares: Vec<Box<dyn Middleware>>,
    /// Answer to the management password prompt
    password: Option<String>,
    max_line_length: usize,
}

impl ManagementSession {
    pub fn new(middlewares: Vec<Box<dyn Middleware>>) -> Self {
        Self {
            middlewares,
            password: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// Send this password when the connection opens
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    /// Serve one connection until EOF, cancellation or an unrecoverable error
    ///
    /// Middlewares are started before the first line is read and stopped
    /// when the loop ends, whatever the reason.
    pub async fn run<S>(&mut self, stream: S, cancel: CancellationToken) -> Result<(), GatekeeperError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let sink: Arc<dyn CommandSink> = Arc::new(ManagementWriter::new(writer));
        let mut lines = FramedRead::new(
            reader,
            ManagementCodec::with_max_line_length(self.max_line_length),
        );

        // The daemon prompts without a trailing newline, so answer up front;
        // it reads the password from its input buffer once it asks.
        if let Some(password) = &self.password {
            sink.send(Command::Password(password.clone())).await?;
        }

        for middleware in self.middlewares.iter_mut() {
            middleware.start(Arc::clone(&sink)).await?;
        }

        let result = self.read_lines(&mut lines, &cancel).await;

        for middleware in self.middlewares.iter_mut() {
            if let Err(e) = middleware.stop().await {
                tracing::debug!("Failed to stop middleware: {}", e);
            }
        }

        result
    }

    async fn read_lines<R>(
        &mut self,
        lines: &mut FramedRead<R, ManagementCodec>,
        cancel: &CancellationToken,
    ) -> Result<(), GatekeeperError>
    where
        R: AsyncRead + Unpin + Send,
    {
        loop {
            let line = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Management session cancelled");
                    return Ok(());
                }
                next = lines.next() => match next {
                    Some(Ok(line)) => line,
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        tracing::info!("Management interface closed the connection");
                        return Ok(());
                    }
                },
            };

            if line.starts_with(PASSWORD_PROMPT) {
                if line.contains("ERROR") {
                    tracing::error!("Management interface rejected the password");
                    return Err(ConnectionError::AuthenticationFailed.into());
                }
                tracing::debug!("Management password accepted");
                continue;
            }

            self.dispatch(&line).await?;
        }
    }

    async fn dispatch(&mut self, line: &str) -> Result<(), GatekeeperError> {
        for middleware in self.middlewares.iter_mut() {
            if middleware.consume_line(line).await? {
                return Ok(());
            }
        }

        tracing::trace!("Unhandled management line: {}", line);
        Ok(())
    }
}
