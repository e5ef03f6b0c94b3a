//! Credential verification trait

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::VerifierError;

/// Decides whether a username/password pair is authenticated
///
/// This is the only coupling point between the management bridge and any
/// identity backend. `Ok(false)` is a rejection; `Err` means no decision
/// could be reached.
#[async_trait]
pub trait CredentialsChecker: Send + Sync {
    async fn check(&self, username: &str, password: &str) -> Result<bool, VerifierError>;
}

#[async_trait]
impl<T: CredentialsChecker + ?Sized> CredentialsChecker for Arc<T> {
    async fn check(&self, username: &str, password: &str) -> Result<bool, VerifierError> {
        (**self).check(username, password).await
    }
}

#[async_trait]
impl<T: CredentialsChecker + ?Sized> CredentialsChecker for Box<T> {
    async fn check(&self, username: &str, password: &str) -> Result<bool, VerifierError> {
        (**self).check(username, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyBob;

    #[async_trait]
    impl CredentialsChecker for OnlyBob {
        async fn check(&self, username: &str, _password: &str) -> Result<bool, VerifierError> {
            Ok(username == "bob")
        }
    }

    #[tokio::test]
    async fn test_boxed_and_shared_checkers_delegate() {
        let boxed: Box<dyn CredentialsChecker> = Box::new(OnlyBob);
        assert!(boxed.check("bob", "x").await.unwrap());
        assert!(!boxed.check("eve", "x").await.unwrap());

        let shared: Arc<dyn CredentialsChecker> = Arc::new(OnlyBob);
        let clone = Arc::clone(&shared);
        assert!(clone.check("bob", "x").await.unwrap());
    }
}
