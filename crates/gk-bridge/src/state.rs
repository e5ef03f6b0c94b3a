//! Daemon state tracking
//!
//! `state on` (sent by the auth middleware) also makes the daemon report
//! its own state changes as `>STATE:` lines. `StateTracker` consumes those
//! so they do not show up as unrecognized traffic, and remembers the last
//! one for diagnostics.

use std::sync::Arc;

use async_trait::async_trait;

use gk_core::error::{ConnectionError, MiddlewareError};
use gk_core::traits::{CommandSink, Middleware};
use gk_protocol::{LinePatterns, ProtocolError, StateNotification};

/// Passive consumer of `>STATE:` notifications
pub struct StateTracker {
    patterns: LinePatterns,
    current: Option<StateNotification>,
}

impl StateTracker {
    pub fn new() -> Result<Self, ProtocolError> {
        Ok(Self {
            patterns: LinePatterns::compile()?,
            current: None,
        })
    }

    /// Last state reported on the current connection
    pub fn current(&self) -> Option<&StateNotification> {
        self.current.as_ref()
    }
}

#[async_trait]
impl Middleware for StateTracker {
    async fn start(&mut self, _connection: Arc<dyn CommandSink>) -> Result<(), ConnectionError> {
        // Notifications are enabled by the auth middleware
        self.current = None;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ConnectionError> {
        Ok(())
    }

    async fn consume_line(&mut self, line: &str) -> Result<bool, MiddlewareError> {
        let Some(state) = self.patterns.state(line) else {
            return Ok(false);
        };

        let changed = self
            .current
            .as_ref()
            .map_or(true, |previous| previous.state != state.state);
        if changed {
            tracing::info!("VPN daemon state: {} {}", state.state, state.detail);
        } else {
            tracing::debug!("VPN daemon state repeated: {}", state.state);
        }

        self.current = Some(state);
        Ok(true)
    }
}
