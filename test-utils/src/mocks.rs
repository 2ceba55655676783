//! Mock implementations for testing.

use async_trait::async_trait;
use credential_cache::{Authenticator, LoginGrant, Role};
use harness_common::{HarnessError, HarnessResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Authenticator that mints unique tokens and records every login.
#[derive(Debug)]
pub struct MockAuthenticator {
    expires_in_secs: u64,
    delay: Option<Duration>,
    failure: Option<(u16, String)>,
    total: AtomicUsize,
    calls: RwLock<HashMap<Role, usize>>,
}

impl Default for MockAuthenticator {
    fn default() -> Self {
        Self::new(86_400)
    }
}

impl MockAuthenticator {
    /// Authenticator issuing tokens valid for `expires_in_secs`.
    #[must_use]
    pub fn new(expires_in_secs: u64) -> Self {
        Self {
            expires_in_secs,
            delay: None,
            failure: None,
            total: AtomicUsize::new(0),
            calls: RwLock::new(HashMap::new()),
        }
    }

    /// Sleep before answering, to widen race windows.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reject every login with `status` and `message`.
    #[must_use]
    pub fn failing(mut self, status: u16, message: impl Into<String>) -> Self {
        self.failure = Some((status, message.into()));
        self
    }

    /// Logins attempted across all roles.
    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Logins attempted for `role`.
    pub async fn calls_for(&self, role: &Role) -> usize {
        self.calls.read().await.get(role).copied().unwrap_or(0)
    }

    /// Forget recorded calls.
    pub async fn reset(&self) {
        self.total.store(0, Ordering::SeqCst);
        self.calls.write().await.clear();
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn authenticate(&self, role: &Role) -> HarnessResult<LoginGrant> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.write().await.entry(role.clone()).or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((status, message)) = &self.failure {
            return Err(HarnessError::auth_failed(role.as_str(), *status, message.clone()));
        }

        Ok(LoginGrant::new(
            format!("{role}-{}", uuid::Uuid::new_v4()),
            self.expires_in_secs,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_per_role() {
        let auth = MockAuthenticator::default();
        let a = auth.authenticate(&Role::Admin).await.unwrap();
        let b = auth.authenticate(&Role::Admin).await.unwrap();
        auth.authenticate(&Role::User).await.unwrap();

        assert_ne!(a.token, b.token);
        assert!(a.token.starts_with("admin-"));
        assert_eq!(auth.calls_for(&Role::Admin).await, 2);
        assert_eq!(auth.calls_for(&Role::User).await, 1);
        assert_eq!(auth.total_calls(), 3);

        auth.reset().await;
        assert_eq!(auth.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_failing() {
        let auth = MockAuthenticator::default().failing(401, "Invalid credentials");
        let err = auth.authenticate(&Role::User).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to login as user: 401 Invalid credentials");
        assert_eq!(auth.total_calls(), 1);
    }
}
