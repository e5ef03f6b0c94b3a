//! Config-file user list

use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use gk_core::error::{ConfigError, VerifierError};
use gk_core::traits::CredentialsChecker;

const UNKNOWN_USER_DIGEST: [u8; 32] = [0; 32];

/// Users and password digests loaded from configuration
///
/// Passwords are stored as lowercase hex SHA-256 digests, never in clear.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, [u8; 32]>,
}

impl StaticCredentials {
    /// Build from a username -> hex digest map
    pub fn from_digests(users: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut parsed = HashMap::with_capacity(users.len());
        for (username, digest) in users {
            let bytes = hex::decode(digest.trim()).map_err(|e| {
                ConfigError::Invalid(format!("Bad password digest for user {}: {}", username, e))
            })?;
            let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
                ConfigError::Invalid(format!(
                    "Password digest for user {} is not a SHA-256 digest",
                    username
                ))
            })?;
            parsed.insert(username.clone(), bytes);
        }

        tracing::debug!("Loaded {} static users", parsed.len());
        Ok(Self { users: parsed })
    }

    /// Hex SHA-256 digest of a password, as stored in the config
    pub fn digest(password: &str) -> String {
        hex::encode(Sha256::digest(password.as_bytes()))
    }

    /// Stored digest for `username`, or a placeholder no password hashes to
    fn expected_digest(&self, username: &str) -> (&[u8; 32], bool) {
        match self.users.get(username) {
            Some(expected) => (expected, true),
            None => (&UNKNOWN_USER_DIGEST, false),
        }
    }
}

#[async_trait]
impl CredentialsChecker for StaticCredentials {
    async fn check(&self, username: &str, password: &str) -> Result<bool, VerifierError> {
        // Unknown users pay for the same hash and compare as known ones
        let (expected, known) = self.expected_digest(username);

        let actual = Sha256::digest(password.as_bytes());
        // Compare every byte regardless of where the first mismatch is
        let diff = expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        Ok(known & (diff == 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(u, p)| (u.to_string(), StaticCredentials::digest(p)))
            .collect()
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        assert_eq!(
            StaticCredentials::digest("secret"),
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
    }

    #[tokio::test]
    async fn test_known_user() {
        let checker = StaticCredentials::from_digests(&users(&[("alice", "secret")])).unwrap();

        assert!(checker.check("alice", "secret").await.unwrap());
        assert!(!checker.check("alice", "Secret").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let checker = StaticCredentials::from_digests(&users(&[("alice", "secret")])).unwrap();
        assert!(!checker.check("mallory", "secret").await.unwrap());
    }

    #[test]
    fn test_rejects_bad_digest() {
        let mut map = HashMap::new();
        map.insert("alice".to_string(), "not-hex".to_string());
        assert!(matches!(
            StaticCredentials::from_digests(&map),
            Err(ConfigError::Invalid(_))
        ));

        map.insert("alice".to_string(), "abcd".to_string());
        assert!(matches!(
            StaticCredentials::from_digests(&map),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_is_hashed_against_placeholder() {
        let checker = StaticCredentials::from_digests(&users(&[("alice", "secret")])).unwrap();

        let (expected, known) = checker.expected_digest("mallory");
        assert!(!known);
        assert_eq!(expected, &UNKNOWN_USER_DIGEST);

        let (_, known) = checker.expected_digest("alice");
        assert!(known);

        assert!(!checker.check("mallory", "").await.unwrap());
    }
}
