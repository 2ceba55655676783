//! Login collaborator used by the cache to obtain fresh tokens.

use crate::role::Role;
use async_trait::async_trait;
use harness_common::HarnessResult;
use std::fmt;

/// Outcome of a successful login exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginGrant {
    /// Bearer token
    pub token: String,
    /// Token lifetime relative to the moment of login
    pub expires_in_secs: u64,
}

impl LoginGrant {
    /// Create a grant.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_in_secs: u64) -> Self {
        Self {
            token: token.into(),
            expires_in_secs,
        }
    }

    /// Lifetime in milliseconds, saturating.
    #[must_use]
    pub fn expires_in_millis(&self) -> i64 {
        i64::try_from(self.expires_in_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

impl fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginGrant")
            .field("token", &"[REDACTED]")
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}

/// Performs the login exchange for a role.
///
/// Implementations must not retry: a rejected login is reported as
/// [`harness_common::HarnessError::AuthenticationFailed`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Log in as `role` and return the issued token.
    async fn authenticate(&self, role: &Role) -> HarnessResult<LoginGrant>;
}
