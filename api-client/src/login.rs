//! Login exchange backing the token cache.

use crate::client::ApiClient;
use crate::models::LoginResponse;
use async_trait::async_trait;
use credential_cache::{Authenticator, LoginGrant, Role};
use harness_common::{Credentials, HarnessConfig, HarnessError, HarnessResult};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// Credentials for each role the harness can log in as.
#[derive(Debug, Clone, Default)]
pub struct TestAccounts {
    accounts: HashMap<Role, Credentials>,
}

impl TestAccounts {
    /// Create an empty account table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admin and user accounts from the harness configuration.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new()
            .with_account(Role::Admin, config.admin.clone())
            .with_account(Role::User, config.user.clone())
    }

    /// Add or replace the account for `role`.
    #[must_use]
    pub fn with_account(mut self, role: Role, credentials: Credentials) -> Self {
        self.accounts.insert(role, credentials);
        self
    }

    /// Credentials for `role`.
    #[must_use]
    pub fn get(&self, role: &Role) -> Option<&Credentials> {
        self.accounts.get(role)
    }
}

/// [`Authenticator`] that posts a role's credentials to the login endpoint.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: ApiClient,
    accounts: TestAccounts,
}

impl HttpAuthenticator {
    /// Create an authenticator.
    #[must_use]
    pub const fn new(client: ApiClient, accounts: TestAccounts) -> Self {
        Self { client, accounts }
    }

    /// Underlying API client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    #[instrument(skip(self), fields(role = %role))]
    async fn authenticate(&self, role: &Role) -> HarnessResult<LoginGrant> {
        let Some(credentials) = self.accounts.get(role) else {
            return Err(HarnessError::auth_failed(
                role.as_str(),
                0,
                "no credentials configured for role",
            ));
        };

        let response = self.client.login(credentials).await?;
        if !response.is_success() {
            warn!(status = response.status_code(), "Login rejected");
            return Err(HarnessError::auth_failed(
                role.as_str(),
                response.status_code(),
                response.message(),
            ));
        }

        let body: LoginResponse = response.json()?;
        info!(expires_in_secs = body.data.expires_in, "Logged in");
        Ok(LoginGrant::new(body.data.token, body.data.expires_in))
    }
}
