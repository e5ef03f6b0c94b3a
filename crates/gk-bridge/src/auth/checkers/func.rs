//! Closure-backed checker

use async_trait::async_trait;

use gk_core::error::VerifierError;
use gk_core::traits::CredentialsChecker;

/// Adapts a plain function into a `CredentialsChecker`
pub struct FnChecker<F> {
    check: F,
}

impl<F> FnChecker<F>
where
    F: Fn(&str, &str) -> Result<bool, VerifierError> + Send + Sync,
{
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

#[async_trait]
impl<F> CredentialsChecker for FnChecker<F>
where
    F: Fn(&str, &str) -> Result<bool, VerifierError> + Send + Sync,
{
    async fn check(&self, username: &str, password: &str) -> Result<bool, VerifierError> {
        (self.check)(username, password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closure_decides() {
        let checker = FnChecker::new(|user: &str, _: &str| Ok(user == "alice"));
        assert!(checker.check("alice", "x").await.unwrap());
        assert!(!checker.check("bob", "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_closure_error_passes_through() {
        let checker =
            FnChecker::new(|_: &str, _: &str| Err(VerifierError::Other("boom".to_string())));
        assert!(matches!(
            checker.check("alice", "x").await,
            Err(VerifierError::Other(_))
        ));
    }
}
