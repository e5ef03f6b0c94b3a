//! Outbound connection to the management interface
//!
//! OpenVPN's `--management` directive makes the daemon listen; Gatekeeper
//! dials it and keeps redialing with backoff whenever the connection drops.

use anyhow::{Context, Result};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use gk_core::config::ManagementConfig;
use gk_core::error::{ConnectionError, GatekeeperError};

use super::reconnect::ExponentialBackoff;
use super::session::ManagementSession;

/// Dials the management interface and runs sessions until cancelled
pub struct ManagementClient {
    config: ManagementConfig,
    session: ManagementSession,
}

impl ManagementClient {
    /// Create a client; `session` carries the middlewares to run
    pub fn new(config: ManagementConfig, session: ManagementSession) -> Self {
        let session = session
            .with_password(config.password.clone())
            .with_max_line_length(config.max_line_length);
        Self { config, session }
    }

    /// Connect, serve and reconnect until `cancel` fires
    ///
    /// Returns an error only when retrying cannot help, i.e. the
    /// management password was rejected.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        let mut backoff = ExponentialBackoff::from_config(&self.config.backoff);

        loop {
            let connected = tokio::select! {
                _ = cancel.cancelled() => break,
                result = TcpStream::connect(&self.config.address) => result,
            };

            match connected {
                Ok(stream) => {
                    tracing::info!("Connected to management interface at {}", self.config.address);
                    backoff.reset();

                    // Commands are single short lines; do not batch them
                    if let Err(e) = stream.set_nodelay(true) {
                        tracing::debug!("Failed to set TCP_NODELAY: {}", e);
                    }

                    match self.session.run(stream, cancel.clone()).await {
                        Ok(()) => {}
                        Err(GatekeeperError::Connection(ConnectionError::AuthenticationFailed)) => {
                            return Err(ConnectionError::AuthenticationFailed).with_context(|| {
                                format!("Management password rejected by {}", self.config.address)
                            });
                        }
                        Err(e) => {
                            tracing::error!("Management session failed: {}", e);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to connect to management interface at {}: {}",
                        self.config.address,
                        e
                    );
                }
            }

            if cancel.is_cancelled() {
                break;
            }

            let delay = backoff.next_delay();
            tracing::debug!("Reconnecting in {:?}", delay);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!("Management client stopped");
        Ok(())
    }
}
