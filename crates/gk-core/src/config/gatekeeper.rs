//! Gatekeeper daemon configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use gk_protocol::DEFAULT_MAX_LINE_LENGTH;

use super::serde_utils::{duration_secs, option_duration_secs};
use crate::error::ConfigError;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// Management interface connection
    pub management: ManagementConfig,

    /// Credential verification backend
    pub verifier: VerifierConfig,
}

impl GatekeeperConfig {
    /// Check cross-field requirements serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.management.address.is_empty() {
            return Err(ConfigError::MissingField("management.address".to_string()));
        }
        self.management.backoff.validate()?;
        if self.management.max_line_length == 0 {
            return Err(ConfigError::Invalid(
                "management.max_line_length must be positive".to_string(),
            ));
        }
        if self.verifier.kind == VerifierKind::Http && self.verifier.url.is_none() {
            return Err(ConfigError::MissingField("verifier.url".to_string()));
        }
        if self.verifier.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid(
                "verifier.timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

/// Connection to the VPN daemon's management interface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagementConfig {
    /// `host:port` the daemon's `--management` directive listens on
    pub address: String,

    /// Answer to `ENTER PASSWORD:` when the interface is password protected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Longest inbound line accepted
    pub max_line_length: usize,

    /// Backoff configuration for reconnections
    pub backoff: BackoffConfig,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:7505".to_string(),
            password: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Exponential backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Initial delay
    #[serde(with = "duration_secs")]
    pub initial: Duration,

    /// Maximum delay
    #[serde(with = "duration_secs")]
    pub max: Duration,

    /// Multiplier for each retry
    pub multiplier: f64,

    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.25,
        }
    }
}

impl BackoffConfig {
    /// Reject values the reconnect loop cannot turn into delays
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "management.backoff.multiplier must be a finite number >= 1.0, got {}",
                self.multiplier
            )));
        }
        if !self.jitter.is_finite() || !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::Invalid(format!(
                "management.backoff.jitter must be between 0.0 and 1.0, got {}",
                self.jitter
            )));
        }
        if self.initial > self.max {
            return Err(ConfigError::Invalid(format!(
                "management.backoff.initial ({:?}) exceeds management.backoff.max ({:?})",
                self.initial, self.max
            )));
        }
        Ok(())
    }
}

/// Which credential backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifierKind {
    /// Users listed in the config file
    #[default]
    Static,
    /// External identity service over HTTP
    Http,
}

/// Credential verification backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub kind: VerifierKind,

    /// Username to lowercase hex SHA-256 of the password (`static` only)
    pub users: HashMap<String, String>,

    /// Endpoint receiving `POST {username, password}` (`http` only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Upper bound on a single check; unbounded when absent
    #[serde(
        with = "option_duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatekeeperConfig::default();
        assert_eq!(config.management.address, "127.0.0.1:7505");
        assert_eq!(config.management.max_line_length, DEFAULT_MAX_LINE_LENGTH);
        assert_eq!(config.verifier.kind, VerifierKind::Static);
        assert!(config.verifier.timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_http_verifier() {
        let config: GatekeeperConfig = toml::from_str(
            r#"
            [management]
            address = "10.0.0.1:7505"
            password = "letmein"

            [verifier]
            kind = "http"
            url = "http://127.0.0.1:4050/verify"
            timeout = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.management.address, "10.0.0.1:7505");
        assert_eq!(config.management.password.as_deref(), Some("letmein"));
        // Untouched sections keep their defaults
        assert_eq!(config.management.backoff.initial, Duration::from_secs(1));
        assert_eq!(config.verifier.kind, VerifierKind::Http);
        assert_eq!(config.verifier.timeout, Some(Duration::from_secs(5)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_static_users() {
        let config: GatekeeperConfig = toml::from_str(
            r#"
            [verifier.users]
            alice = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
            "#,
        )
        .unwrap();

        assert_eq!(config.verifier.kind, VerifierKind::Static);
        assert!(config.verifier.users.contains_key("alice"));
    }

    #[test]
    fn test_http_without_url_is_invalid() {
        let mut config = GatekeeperConfig::default();
        config.verifier.kind = VerifierKind::Http;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(field)) if field == "verifier.url"
        ));
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut config = GatekeeperConfig::default();
        config.verifier.timeout = Some(Duration::ZERO);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_backoff_table_keeps_defaults() {
        let config: GatekeeperConfig = toml::from_str(
            r#"
            [management.backoff]
            initial = 2
            "#,
        )
        .unwrap();

        let backoff = &config.management.backoff;
        assert_eq!(backoff.initial, Duration::from_secs(2));
        assert_eq!(backoff.max, Duration::from_secs(30));
        assert_eq!(backoff.multiplier, 2.0);
        assert_eq!(backoff.jitter, 0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_multiplier_is_invalid() {
        let config: GatekeeperConfig = toml::from_str(
            r#"
            [management.backoff]
            multiplier = -2.0
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_shrinking_multiplier_is_invalid() {
        let mut config = GatekeeperConfig::default();
        config.management.backoff.multiplier = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_finite_backoff_is_invalid() {
        let mut config = GatekeeperConfig::default();
        config.management.backoff.multiplier = f64::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GatekeeperConfig::default();
        config.management.backoff.jitter = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_jitter_out_of_range_is_invalid() {
        let mut config = GatekeeperConfig::default();
        config.management.backoff.jitter = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_initial_above_max_is_invalid() {
        let mut config = GatekeeperConfig::default();
        config.management.backoff.initial = Duration::from_secs(60);
        config.management.backoff.max = Duration::from_secs(10);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
