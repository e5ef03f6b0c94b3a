//! Management-interface client authentication state machine
//!
//! With `--management-client-auth`, OpenVPN announces every connection
//! attempt (and every key renegotiation) as a block of lines:
//!
//! ```text
//! >CLIENT:CONNECT,<cid>,<kid>
//! >CLIENT:ENV,username=alice
//! >CLIENT:ENV,password=secret
//! ...
//! >CLIENT:ENV,END
//! ```
//!
//! and then waits until the management client answers with
//! `client-auth-nt <cid> <kid>` or `client-deny <cid> <kid> <reason>`.
//! Other notifications may be interleaved with the block; those lines are
//! left for other consumers.

use std::sync::Arc;

use async_trait::async_trait;

use gk_core::error::{ConnectionError, MiddlewareError, SequenceError};
use gk_core::traits::{CommandSink, CredentialsChecker, Middleware};
use gk_protocol::{ClientKey, Command, DenyReason, LinePatterns, ProtocolError};

/// Where the current authentication round stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No round open; `>CLIENT:ENV` lines are not ours
    #[default]
    Idle,
    /// A connect/re-auth event opened a round; collecting credentials
    AwaitingCredentials,
}

/// Result of testing one line against one rule
enum RuleOutcome {
    /// The rule does not apply; try the next one
    NoMatch,
    /// The rule applied and the line is consumed
    Matched,
    /// The rule applied but the line cannot be honored
    Failed(MiddlewareError),
}

impl RuleOutcome {
    fn into_consumed(self) -> Option<Result<bool, MiddlewareError>> {
        match self {
            Self::NoMatch => None,
            Self::Matched => Some(Ok(true)),
            Self::Failed(e) => Some(Err(e)),
        }
    }
}

type Rule<C> = fn(&mut AuthMiddleware<C>, &str) -> RuleOutcome;

/// Authenticates OpenVPN clients announced on the management interface
///
/// One instance serves one management connection. At most one round is
/// open at a time and every round closed by `>CLIENT:ENV,END` is answered
/// with exactly one `client-auth-nt` or `client-deny`.
pub struct AuthMiddleware<C> {
    /// Backend deciding each username/password pair
    checker: C,
    /// Compiled line patterns
    patterns: LinePatterns,
    /// Write side of the management connection, bound by `start`
    connection: Option<Arc<dyn CommandSink>>,
    phase: Phase,
    /// Ids of the open round; `None` when no round is open
    client: Option<ClientKey>,
    pending_username: String,
    pending_password: String,
}

impl<C: CredentialsChecker> AuthMiddleware<C> {
    /// Create a middleware deciding rounds with `checker`
    ///
    /// Fails only if the built-in line patterns do not compile.
    pub fn new(checker: C) -> Result<Self, ProtocolError> {
        Ok(Self {
            checker,
            patterns: LinePatterns::compile()?,
            connection: None,
            phase: Phase::Idle,
            client: None,
            pending_username: String::new(),
            pending_password: String::new(),
        })
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Ids of the open round, if any
    pub fn client(&self) -> Option<ClientKey> {
        self.client
    }

    /// Drop the open round and any credentials collected for it
    pub fn reset(&mut self) {
        self.pending_username.clear();
        self.pending_password.clear();
        self.client = None;
        self.phase = Phase::Idle;
    }

    fn open_round(&mut self, client: ClientKey) {
        self.reset();
        self.phase = Phase::AwaitingCredentials;
        self.client = Some(client);
        tracing::debug!(
            "Auth round opened for client {} key {}",
            client.client_id,
            client.key_id
        );
    }

    fn check_reauth(&mut self, line: &str) -> RuleOutcome {
        match self.patterns.reauth(line) {
            None => RuleOutcome::NoMatch,
            Some(Ok(client)) => {
                self.open_round(client);
                RuleOutcome::Matched
            }
            Some(Err(e)) => RuleOutcome::Failed(e.into()),
        }
    }

    fn check_connect(&mut self, line: &str) -> RuleOutcome {
        match self.patterns.connect(line) {
            None => RuleOutcome::NoMatch,
            Some(Ok(client)) => {
                self.open_round(client);
                RuleOutcome::Matched
            }
            Some(Err(e)) => RuleOutcome::Failed(e.into()),
        }
    }

    fn check_username(&mut self, line: &str) -> RuleOutcome {
        let Some(value) = self.patterns.username(line) else {
            return RuleOutcome::NoMatch;
        };
        if self.client.is_none() {
            return RuleOutcome::Failed(SequenceError::NoClientTracked.into());
        }
        self.pending_username = value.to_string();
        RuleOutcome::Matched
    }

    fn check_password(&mut self, line: &str) -> RuleOutcome {
        let Some(value) = self.patterns.password(line) else {
            return RuleOutcome::NoMatch;
        };
        if self.client.is_none() {
            return RuleOutcome::Failed(SequenceError::NoClientTracked.into());
        }
        self.pending_password = value.to_string();
        RuleOutcome::Matched
    }

    /// Close the round and answer it
    async fn authenticate_client(&mut self) -> Result<(), MiddlewareError> {
        let client = self.client;
        let username = std::mem::take(&mut self.pending_username);
        let password = std::mem::take(&mut self.pending_password);
        self.reset();

        let Some(client) = client else {
            return Err(SequenceError::NoClientTracked.into());
        };

        if username.is_empty() || password.is_empty() {
            tracing::warn!(
                "Client {} key {} sent no username or password",
                client.client_id,
                client.key_id
            );
            self.deny(client, DenyReason::MissingCredentials).await;
            return Ok(());
        }

        tracing::info!(
            "Authenticating user: {} clientID: {} keyID: {}",
            username,
            client.client_id,
            client.key_id
        );

        match self.checker.check(&username, &password).await {
            Ok(true) => {
                tracing::info!("User {} authenticated (client {})", username, client.client_id);
                self.send(Command::ClientAuthNt(client)).await;
            }
            Ok(false) => {
                tracing::info!("User {} rejected (client {})", username, client.client_id);
                self.deny(client, DenyReason::WrongCredentials).await;
            }
            Err(e) => {
                tracing::error!("Authentication error: {}", e);
                self.deny(client, DenyReason::InternalError).await;
            }
        }

        Ok(())
    }

    async fn deny(&self, client: ClientKey, reason: DenyReason) {
        self.send(Command::ClientDeny { client, reason }).await;
    }

    /// Write a command; failures are logged, never retried
    async fn send(&self, command: Command) {
        let Some(connection) = &self.connection else {
            tracing::error!(
                "Management connection not bound, dropping {} command",
                command.name()
            );
            return;
        };

        if let Err(e) = connection.send(command).await {
            tracing::error!("Management communication error: {}", e);
        }
    }

    #[cfg(test)]
    fn force_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

#[async_trait]
impl<C: CredentialsChecker> Middleware for AuthMiddleware<C> {
    async fn start(&mut self, connection: Arc<dyn CommandSink>) -> Result<(), ConnectionError> {
        self.reset();
        connection.send(Command::StateOn).await?;
        self.connection = Some(connection);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ConnectionError> {
        let connection = self.connection.as_ref().ok_or(ConnectionError::NotStarted)?;
        connection.send(Command::StateOff).await
    }

    async fn consume_line(&mut self, line: &str) -> Result<bool, MiddlewareError> {
        let openers: [Rule<C>; 2] = [Self::check_reauth, Self::check_connect];
        for rule in openers {
            if let Some(result) = rule(self, line).into_consumed() {
                return result;
            }
        }

        // Everything below belongs to an open round
        if self.phase != Phase::AwaitingCredentials {
            return Ok(false);
        }

        let collectors: [Rule<C>; 2] = [Self::check_username, Self::check_password];
        for rule in collectors {
            if let Some(result) = rule(self, line).into_consumed() {
                return result;
            }
        }

        if self.patterns.is_env_end(line) {
            self.authenticate_client().await?;
            return Ok(true);
        }

        Ok(false)
    }
}
