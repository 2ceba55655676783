//! Centralized error types for the test harness.
//!
//! Every crate in the workspace reports failures through [`HarnessError`], a
//! closed set of variants carrying typed fields (role, status code, schema
//! key, violation list) so test reports can name exactly what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// Common error type for harness operations.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The login endpoint rejected the credentials for a role.
    #[error("Failed to login as {role}: {status} {message}")]
    AuthenticationFailed {
        /// Role whose login was attempted
        role: String,
        /// HTTP status returned by the service
        status: u16,
        /// Message returned by the service
        message: String,
    },

    /// No schema is registered under the requested key.
    #[error("Schema not found: {key}. Available schemas: {}", .available.join(", "))]
    SchemaNotFound {
        /// Requested key
        key: String,
        /// Keys registered at the time of the lookup
        available: Vec<String>,
    },

    /// A schema document could not be parsed or compiled.
    #[error("Failed to compile schema {key}: {reason}")]
    SchemaCompilationFailed {
        /// Schema key
        key: String,
        /// Parser or compiler message
        reason: String,
    },

    /// Data did not conform to a schema.
    #[error("Schema validation failed for '{key}':\n  - {}", .violations.join("\n  - "))]
    SchemaValidationFailed {
        /// Schema key
        key: String,
        /// Every violation, in validator order
        violations: Vec<String>,
    },

    /// The request dispatcher was asked for a verb it does not know.
    #[error("Unsupported HTTP method: {verb}")]
    UnsupportedOperation {
        /// The verb as supplied by the caller
        verb: String,
    },

    /// The reset endpoint returned a non-success status.
    #[error("Failed to reset database: {status} {message}")]
    ResetFailed {
        /// HTTP status returned by the service
        status: u16,
        /// Message returned by the service
        message: String,
    },

    /// A response did not meet an expectation on its status or body.
    #[error("Unexpected response: expected {expected}, got {status}: {detail}")]
    UnexpectedResponse {
        /// What the caller expected
        expected: String,
        /// HTTP status of the response
        status: u16,
        /// What was found instead
        detail: String,
    },

    /// HTTP transport failure, including timeouts
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while reading schema documents
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

impl HarnessError {
    /// Check if this error signals a failed expectation rather than broken
    /// infrastructure.
    ///
    /// # Examples
    ///
    /// ```
    /// use harness_common::HarnessError;
    ///
    /// let err = HarnessError::validation_failed("user", vec!["root: bad".to_string()]);
    /// assert!(err.is_test_failure());
    ///
    /// let err = HarnessError::unsupported("PATCH");
    /// assert!(!err.is_test_failure());
    /// ```
    #[must_use]
    pub const fn is_test_failure(&self) -> bool {
        matches!(
            self,
            Self::SchemaValidationFailed { .. }
                | Self::AuthenticationFailed { .. }
                | Self::UnexpectedResponse { .. }
        )
    }

    /// Create an authentication failure for the given role.
    #[must_use]
    pub fn auth_failed(role: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            role: role.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a schema-not-found error listing the available keys.
    #[must_use]
    pub fn schema_not_found(key: impl Into<String>, available: Vec<String>) -> Self {
        Self::SchemaNotFound {
            key: key.into(),
            available,
        }
    }

    /// Create a schema compilation error.
    #[must_use]
    pub fn compilation_failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaCompilationFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a schema validation failure.
    #[must_use]
    pub fn validation_failed(key: impl Into<String>, violations: Vec<String>) -> Self {
        Self::SchemaValidationFailed {
            key: key.into(),
            violations,
        }
    }

    /// Create an unsupported operation error.
    #[must_use]
    pub fn unsupported(verb: impl Into<String>) -> Self {
        Self::UnsupportedOperation { verb: verb.into() }
    }

    /// Create a reset failure.
    #[must_use]
    pub fn reset_failed(status: u16, message: impl Into<String>) -> Self {
        Self::ResetFailed {
            status,
            message: message.into(),
        }
    }

    /// Create an unmet response expectation.
    #[must_use]
    pub fn unexpected_response(
        expected: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self::UnexpectedResponse {
            expected: expected.into(),
            status,
            detail: detail.into(),
        }
    }

    /// Create an I/O error for the given path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
