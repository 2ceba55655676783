//! Environment-driven harness configuration.
//!
//! Values come from the process environment after loading an optional `.env`
//! file. Every field has a default, so a bare checkout runs against the public
//! demo service.

use crate::http::HttpConfig;
use crate::tracing_config::TracingConfig;
use secrecy::SecretString;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Default base URL of the user-management API.
pub const DEFAULT_BASE_URL: &str = "https://material.playwrightvn.com/api/user-management/v1";

/// Variables that should be set explicitly for runs against a real environment.
pub const CREDENTIAL_VARS: [&str; 5] = [
    "BASE_URL",
    "ADMIN_EMAIL",
    "ADMIN_PASSWORD",
    "USER_EMAIL",
    "USER_PASSWORD",
];

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Variable holding the URL
        field: String,
        /// Parser message
        reason: String,
    },

    /// Invalid timeout value
    #[error("Invalid timeout: must be greater than 0")]
    InvalidTimeout,

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Login credentials for one test account.
#[derive(Clone)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials from an email and a password.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Harness configuration.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base API URL, without trailing slash
    pub base_url: String,
    /// Admin account
    pub admin: Credentials,
    /// Regular user account
    pub user: Credentials,
    /// Directory holding `<key>.schema.json` documents
    pub schemas_dir: PathBuf,
    /// Per-request timeout in seconds (must be > 0)
    pub request_timeout_secs: u64,
    /// Remaining validity a cached token must have to be reused, in seconds
    pub token_safety_margin_secs: u64,
    /// Log level filter
    pub log_level: String,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            admin: Credentials::new("admin@example.com", "password"),
            user: Credentials::new("john.doe@example.com", "password"),
            schemas_dir: PathBuf::from("data/schemas"),
            request_timeout_secs: 30,
            token_safety_margin_secs: 300,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or if the
    /// resulting configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or if the
    /// resulting configuration is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing: Vec<&str> = CREDENTIAL_VARS
            .iter()
            .copied()
            .filter(|name| lookup(name).is_none())
            .collect();
        if !missing.is_empty() {
            warn!(missing = %missing.join(", "), "Missing environment variables, using defaults");
        }

        let defaults = Self::default();
        let string_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let config = Self {
            base_url: parse_base_url(lookup("BASE_URL").as_deref().unwrap_or(DEFAULT_BASE_URL))?,
            admin: Credentials::new(
                string_or("ADMIN_EMAIL", &defaults.admin.email),
                string_or("ADMIN_PASSWORD", "password"),
            ),
            user: Credentials::new(
                string_or("USER_EMAIL", &defaults.user.email),
                string_or("USER_PASSWORD", "password"),
            ),
            schemas_dir: lookup("SCHEMAS_DIR").map_or(defaults.schemas_dir, PathBuf::from),
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT", defaults.request_timeout_secs)?,
            token_safety_margin_secs: parse_var(
                &lookup,
                "TOKEN_SAFETY_MARGIN",
                defaults.token_safety_margin_secs,
            )?,
            log_level: string_or("LOG_LEVEL", &defaults.log_level),
            log_json: parse_var(&lookup, "LOG_JSON", defaults.log_json)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Set the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Set the schema directory.
    #[must_use]
    pub fn with_schemas_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schemas_dir = dir.into();
        self
    }

    /// Set the admin account.
    #[must_use]
    pub fn with_admin(mut self, credentials: Credentials) -> Self {
        self.admin = credentials;
        self
    }

    /// Set the regular user account.
    #[must_use]
    pub fn with_user(mut self, credentials: Credentials) -> Self {
        self.user = credentials;
        self
    }

    /// Token safety margin as a duration.
    #[must_use]
    pub const fn token_safety_margin(&self) -> Duration {
        Duration::from_secs(self.token_safety_margin_secs)
    }

    /// HTTP settings derived from this config.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::default().with_timeout(Duration::from_secs(self.request_timeout_secs))
    }

    /// Tracing settings derived from this config.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let config = TracingConfig::default().with_log_level(&self.log_level);
        if self.log_json {
            config.with_json_output()
        } else {
            config
        }
    }
}

/// Parse a variable with a default value.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Validate a base URL and strip its trailing slash.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        field: "BASE_URL".to_string(),
        reason: e.to_string(),
    })?;
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = HarnessConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.admin.email, "admin@example.com");
        assert_eq!(config.user.email, "john.doe@example.com");
        assert_eq!(config.user.password.expose_secret(), "password");
        assert_eq!(config.token_safety_margin(), Duration::from_secs(300));
        assert_eq!(config.schemas_dir, PathBuf::from("data/schemas"));
    }

    #[test]
    fn test_overrides() {
        let config = HarnessConfig::from_lookup(lookup_from(&[
            ("BASE_URL", "http://localhost:8080/api/"),
            ("ADMIN_EMAIL", "root@test.local"),
            ("ADMIN_PASSWORD", "s3cret"),
            ("REQUEST_TIMEOUT", "5"),
            ("LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.admin.email, "root@test.local");
        assert_eq!(config.admin.password.expose_secret(), "s3cret");
        assert_eq!(config.http_config().timeout, Duration::from_secs(5));
        assert!(config.tracing_config().json_output);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = HarnessConfig::from_lookup(lookup_from(&[("BASE_URL", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let result = HarnessConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT", "soon")]));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = HarnessConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT", "0")]));
        assert!(matches!(result, Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::new("admin@example.com", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("admin@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        let loaded = HarnessConfig::from_env();
        let direct = HarnessConfig::from_lookup(|name| env::var(name).ok());

        match (loaded, direct) {
            (Ok(loaded), Ok(direct)) => {
                assert_eq!(loaded.base_url, direct.base_url);
                assert_eq!(loaded.admin.email, direct.admin.email);
                assert_eq!(loaded.token_safety_margin(), direct.token_safety_margin());
                if env::var("BASE_URL").is_err() {
                    assert_eq!(loaded.base_url, DEFAULT_BASE_URL);
                }
            }
            (Err(loaded), Err(direct)) => assert_eq!(loaded.to_string(), direct.to_string()),
            (loaded, direct) => panic!("diverged: {loaded:?} vs {direct:?}"),
        }
    }
}
