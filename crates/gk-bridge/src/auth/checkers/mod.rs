//! Credential checker backends
//!
//! Each backend implements `CredentialsChecker`. `from_config` picks one
//! from the `[verifier]` section and applies the optional timeout.

mod func;
mod http;
mod static_users;
mod timeout;

pub use func::FnChecker;
pub use http::HttpCredentials;
pub use static_users::StaticCredentials;
pub use timeout::TimeoutChecker;

use gk_core::config::{VerifierConfig, VerifierKind};
use gk_core::error::ConfigError;
use gk_core::traits::CredentialsChecker;

/// Build the checker described by `config`
pub fn from_config(config: &VerifierConfig) -> Result<Box<dyn CredentialsChecker>, ConfigError> {
    let checker: Box<dyn CredentialsChecker> = match config.kind {
        VerifierKind::Static => {
            if config.users.is_empty() {
                tracing::warn!("No users configured - all clients will be rejected");
            }
            Box::new(StaticCredentials::from_digests(&config.users)?)
        }
        VerifierKind::Http => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| ConfigError::MissingField("verifier.url".to_string()))?;
            Box::new(HttpCredentials::new(url)?)
        }
    };

    Ok(match config.timeout {
        Some(timeout) => Box::new(TimeoutChecker::new(checker, timeout)),
        None => checker,
    })
}
