//! Client and key identifier types
//!
//! OpenVPN numbers every connection attempt with a client id (CID) and every
//! TLS key renegotiation within it with a key id (KID). Both are echoed back
//! verbatim in `client-auth-nt` / `client-deny`.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Identifier of a client connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ClientId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for ClientId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|_| ProtocolError::InvalidId {
            kind: "client",
            value: s.to_string(),
        })
    }
}

/// Key renegotiation identifier within one client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub u64);

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for KeyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for KeyId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|_| ProtocolError::InvalidId {
            kind: "key",
            value: s.to_string(),
        })
    }
}

/// The (client, key) pair addressed by an auth decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientKey {
    pub client_id: ClientId,
    pub key_id: KeyId,
}

impl ClientKey {
    pub fn new(client_id: impl Into<ClientId>, key_id: impl Into<KeyId>) -> Self {
        Self {
            client_id: client_id.into(),
            key_id: key_id.into(),
        }
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.client_id, self.key_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_key_display() {
        let key = ClientKey::new(5, 0);
        assert_eq!(format!("{}", key), "5 0");
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!("42".parse::<ClientId>().unwrap(), ClientId(42));
        assert_eq!("7".parse::<KeyId>().unwrap(), KeyId(7));
    }

    #[test]
    fn test_parse_overflow() {
        let result = "99999999999999999999999".parse::<ClientId>();
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidId { kind: "client", .. })
        ));
    }
}
