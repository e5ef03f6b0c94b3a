//! Outbound management commands
//!
//! Every command is a single line of text. The `Display` impl renders the
//! exact wire form without the trailing newline; the codec appends it.

use std::fmt;

use crate::ids::ClientKey;

/// Reason sent along with `client-deny`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Username or password was empty or absent
    MissingCredentials,
    /// The verifier failed; the cause is not echoed to the daemon
    InternalError,
    /// The verifier rejected the credentials
    WrongCredentials,
}

impl DenyReason {
    /// Message text written after the ids
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing username or password",
            Self::InternalError => "internal error",
            Self::WrongCredentials => "wrong username or password",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command written to the management interface
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// Enable real-time state and client notifications
    StateOn,
    /// Disable notifications
    StateOff,
    /// Accept a pending client (`client-auth-nt CID KID`)
    ClientAuthNt(ClientKey),
    /// Reject a pending client (`client-deny CID KID reason`)
    ClientDeny { client: ClientKey, reason: DenyReason },
    /// Answer to the `ENTER PASSWORD:` prompt
    Password(String),
}

impl Command {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::StateOn => "state-on",
            Self::StateOff => "state-off",
            Self::ClientAuthNt(_) => "client-auth-nt",
            Self::ClientDeny { .. } => "client-deny",
            Self::Password(_) => "password",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateOn => f.write_str("state on"),
            Self::StateOff => f.write_str("state off"),
            Self::ClientAuthNt(client) => write!(f, "client-auth-nt {}", client),
            Self::ClientDeny { client, reason } => write!(f, "client-deny {} {}", client, reason),
            Self::Password(password) => f.write_str(password),
        }
    }
}

// Hand-written so the management password never reaches a log line.
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(<redacted>)"),
            other => write!(f, "{}({})", other.name(), other),
        }
    }
}
