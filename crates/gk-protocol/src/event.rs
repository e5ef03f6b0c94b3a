//! Inbound event recognition
//!
//! The management interface interleaves many kinds of notifications on one
//! socket. `LinePatterns` holds the compiled patterns for the lines
//! Gatekeeper cares about:
//!
//! | Line | Meaning |
//! |---|---|
//! | `>CLIENT:CONNECT,<cid>,<kid>` | new connection attempt begins |
//! | `>CLIENT:REAUTH,<cid>,<kid>` | key renegotiation begins |
//! | `>CLIENT:ENV,username=<value>` | username for the current round |
//! | `>CLIENT:ENV,password=<value>` | password for the current round |
//! | `>CLIENT:ENV,END` | environment block closed |
//! | `>STATE:<time>,<state>,...` | daemon state change (after `state on`) |
//!
//! Patterns are compiled once; a failure to compile is a programming error
//! surfaced at construction, never per line.

use regex::Regex;

use crate::error::ProtocolError;
use crate::ids::{ClientId, ClientKey, KeyId};

/// Prompt sent by a password-protected management interface
pub const PASSWORD_PROMPT: &str = "ENTER PASSWORD:";

const REAUTH_PATTERN: &str = r"^>CLIENT:REAUTH,(\d+),(\d+)$";
const CONNECT_PATTERN: &str = r"^>CLIENT:CONNECT,(\d+),(\d+)$";
const USERNAME_PATTERN: &str = r"^>CLIENT:ENV,username=(.*)$";
const PASSWORD_PATTERN: &str = r"^>CLIENT:ENV,password=(.*)$";
const ENV_END_PATTERN: &str = r"^>CLIENT:ENV,END$";
const STATE_PATTERN: &str = r"^>STATE:(\d+),([A-Z_]+),?(.*)$";

/// A `>STATE:` notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNotification {
    /// Unix time reported by the daemon
    pub timestamp: u64,
    /// State name, e.g. `CONNECTED`
    pub state: String,
    /// Remaining comma-separated fields, verbatim
    pub detail: String,
}

/// Compiled line patterns
#[derive(Debug, Clone)]
pub struct LinePatterns {
    reauth: Regex,
    connect: Regex,
    username: Regex,
    password: Regex,
    env_end: Regex,
    state: Regex,
}

impl LinePatterns {
    /// Compile all patterns
    pub fn compile() -> Result<Self, ProtocolError> {
        Ok(Self {
            reauth: Regex::new(REAUTH_PATTERN)?,
            connect: Regex::new(CONNECT_PATTERN)?,
            username: Regex::new(USERNAME_PATTERN)?,
            password: Regex::new(PASSWORD_PATTERN)?,
            env_end: Regex::new(ENV_END_PATTERN)?,
            state: Regex::new(STATE_PATTERN)?,
        })
    }

    /// Match `>CLIENT:REAUTH,<cid>,<kid>`
    ///
    /// Returns `None` when the line is not a re-auth event, and an error
    /// when it is one but the ids do not fit.
    pub fn reauth(&self, line: &str) -> Option<Result<ClientKey, ProtocolError>> {
        Self::client_key(&self.reauth, line)
    }

    /// Match `>CLIENT:CONNECT,<cid>,<kid>`
    pub fn connect(&self, line: &str) -> Option<Result<ClientKey, ProtocolError>> {
        Self::client_key(&self.connect, line)
    }

    /// Match `>CLIENT:ENV,username=<value>`
    pub fn username<'a>(&self, line: &'a str) -> Option<&'a str> {
        Self::env_value(&self.username, line)
    }

    /// Match `>CLIENT:ENV,password=<value>`
    pub fn password<'a>(&self, line: &'a str) -> Option<&'a str> {
        Self::env_value(&self.password, line)
    }

    /// Match `>CLIENT:ENV,END`
    pub fn is_env_end(&self, line: &str) -> bool {
        self.env_end.is_match(line)
    }

    /// Match a `>STATE:` notification
    pub fn state(&self, line: &str) -> Option<StateNotification> {
        let caps = self.state.captures(line)?;
        // Timestamps beyond u64 are not real; treat them as unrecognized.
        let timestamp = caps[1].parse().ok()?;
        Some(StateNotification {
            timestamp,
            state: caps[2].to_string(),
            detail: caps[3].to_string(),
        })
    }

    fn client_key(rule: &Regex, line: &str) -> Option<Result<ClientKey, ProtocolError>> {
        let caps = rule.captures(line)?;
        let parsed = caps[1]
            .parse::<ClientId>()
            .and_then(|client_id| {
                caps[2].parse::<KeyId>().map(|key_id| ClientKey { client_id, key_id })
            });
        Some(parsed)
    }

    fn env_value<'a>(rule: &Regex, line: &'a str) -> Option<&'a str> {
        rule.captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}
