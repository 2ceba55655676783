//! Client for the user-management API under test.
//!
//! [`ApiClient`] wraps the service's endpoints; [`HttpAuthenticator`] plugs
//! the login endpoint into the [`credential_cache::TokenCache`].
//!
//! ```no_run
//! # async fn demo() -> harness_common::HarnessResult<()> {
//! use api_client::{ApiClient, HttpAuthenticator, TestAccounts};
//! use credential_cache::{Role, TokenCache};
//! use harness_common::HarnessConfig;
//!
//! let config = HarnessConfig::default();
//! let client = ApiClient::from_config(&config)?;
//! let auth = HttpAuthenticator::new(client.clone(), TestAccounts::from_config(&config));
//!
//! let token = TokenCache::shared().get_token(&Role::Admin, &auth).await?;
//! let users = client.list_users(&token).await?;
//! assert!(users.is_success());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod login;
pub mod models;
pub mod response;

pub use client::{
    ApiClient, LOGIN_ENDPOINT, PROFILE_ENDPOINT, RESET_ENDPOINT, USERS_ENDPOINT, Verb,
};
pub use login::{HttpAuthenticator, TestAccounts};
pub use models::{
    CreateUserRequest, ErrorResponse, LoginData, LoginResponse, UpdateProfileRequest,
    UpdateUserRequest, User, UserId, UserRole,
};
pub use response::ApiResponse;
