//! Upper bound on a single credential check
//!
//! The auth round waits for the checker inline, so a checker that never
//! answers stalls the whole management connection. Wrapping it bounds
//! that wait; an expired check is reported as a verifier failure and the
//! client is denied with "internal error".

use std::time::Duration;

use async_trait::async_trait;

use gk_core::error::VerifierError;
use gk_core::traits::CredentialsChecker;

/// Fails checks that take longer than `timeout`
pub struct TimeoutChecker<C> {
    inner: C,
    timeout: Duration,
}

impl<C: CredentialsChecker> TimeoutChecker<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<C: CredentialsChecker> CredentialsChecker for TimeoutChecker<C> {
    async fn check(&self, username: &str, password: &str) -> Result<bool, VerifierError> {
        match tokio::time::timeout(self.timeout, self.inner.check(username, password)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Credential check for {} timed out after {:?}", username, self.timeout);
                Err(VerifierError::Timeout(self.timeout))
            }
        }
    }
}
