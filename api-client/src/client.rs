//! User-management API client.
//!
//! A thin passthrough over `reqwest`: every helper issues exactly one request
//! and hands back the buffered [`ApiResponse`], whatever its status. Only
//! [`ApiClient::reset_database`] interprets the status.

use crate::models::{CreateUserRequest, LoginRequest, UpdateProfileRequest, UpdateUserRequest};
use crate::response::ApiResponse;
use harness_common::{Credentials, HarnessConfig, HarnessError, HarnessResult, HttpConfig, build_http_client};
use reqwest::{Client, Method};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{Value, json};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

/// Login endpoint.
pub const LOGIN_ENDPOINT: &str = "/login.php";
/// User collection endpoint.
pub const USERS_ENDPOINT: &str = "/users.php";
/// Current user's profile endpoint.
pub const PROFILE_ENDPOINT: &str = "/profile.php";
/// Database reset endpoint.
pub const RESET_ENDPOINT: &str = "/reset.php";

/// Verbs accepted by [`ApiClient::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    const fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

impl FromStr for Verb {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(HarnessError::unsupported(s)),
        }
    }
}

/// Client for the user-management API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, http: &HttpConfig) -> HarnessResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http: build_http_client(http)?,
            base_url,
        })
    }

    /// Create a client from the harness configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &HarnessConfig) -> HarnessResult<Self> {
        Self::new(config.base_url.clone(), &config.http_config())
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /login.php` with the given credentials.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] on network failure.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> HarnessResult<ApiResponse> {
        let body = LoginRequest {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };
        self.send(Method::POST, LOGIN_ENDPOINT, None, Some(&body)).await
    }

    /// `GET /users.php`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] on network failure.
    pub async fn list_users(&self, token: &str) -> HarnessResult<ApiResponse> {
        self.send::<Value>(Method::GET, USERS_ENDPOINT, Some(token), None).await
    }

    /// `POST /users.php`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] on network failure.
    pub async fn create_user(
        &self,
        token: &str,
        user: &CreateUserRequest,
    ) -> HarnessResult<ApiResponse> {
        self.send(Method::POST, USERS_ENDPOINT, Some(token), Some(user)).await
    }

    /// `PUT /users.php`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] on network failure.
    pub async fn update_user(
        &self,
        token: &str,
        user: &UpdateUserRequest,
    ) -> HarnessResult<ApiResponse> {
        self.send(Method::PUT, USERS_ENDPOINT, Some(token), Some(user)).await
    }

    /// `DELETE /users.php` with `{"id": user_id}` as body.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] on network failure.
    pub async fn delete_user(&self, token: &str, user_id: i64) -> HarnessResult<ApiResponse> {
        let body = json!({ "id": user_id });
        self.send(Method::DELETE, USERS_ENDPOINT, Some(token), Some(&body)).await
    }

    /// `GET /profile.php`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] on network failure.
    pub async fn get_profile(&self, token: &str) -> HarnessResult<ApiResponse> {
        self.send::<Value>(Method::GET, PROFILE_ENDPOINT, Some(token), None).await
    }

    /// `PUT /profile.php`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] on network failure.
    pub async fn update_profile(
        &self,
        token: &str,
        profile: &UpdateProfileRequest,
    ) -> HarnessResult<ApiResponse> {
        self.send(Method::PUT, PROFILE_ENDPOINT, Some(token), Some(profile)).await
    }

    /// `POST /reset.php`, restoring the service's sample data.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ResetFailed`] for a non-2xx status and
    /// [`HarnessError::Transport`] on network failure.
    #[instrument(skip(self))]
    pub async fn reset_database(&self) -> HarnessResult<ApiResponse> {
        let response = self.send::<Value>(Method::POST, RESET_ENDPOINT, None, None).await?;
        if !response.is_success() {
            warn!(status = response.status_code(), "Database reset rejected");
            return Err(HarnessError::reset_failed(response.status_code(), response.text()));
        }
        info!("Database reset");
        Ok(response)
    }

    /// Issue `verb` against `endpoint` (relative to the base URL).
    ///
    /// `verb` is matched case-insensitively against GET, POST, PUT and DELETE.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnsupportedOperation`] for any other verb,
    /// before any network I/O, and [`HarnessError::Transport`] on network
    /// failure.
    pub async fn request(
        &self,
        verb: &str,
        endpoint: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> HarnessResult<ApiResponse> {
        let verb: Verb = verb.parse()?;
        self.send(verb.method(), endpoint, token, body).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> HarnessResult<ApiResponse> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(%method, %url, authenticated = token.is_some(), "Sending request");

        let mut request = self.http.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = ApiResponse::read(request.send().await?).await?;
        debug!(status = response.status_code(), %url, "Received response");
        Ok(response)
    }
}
