//! Buffered HTTP responses.

use harness_common::{HarnessError, HarnessResult};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use schema_registry::SchemaRegistry;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A fully read response.
///
/// The body is parsed eagerly: empty bodies become [`Value::Null`] and bodies
/// that are not JSON are kept verbatim as [`Value::String`], so schema
/// assertions can run on any response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed body
    pub body: Value,
}

impl ApiResponse {
    pub(crate) async fn read(response: reqwest::Response) -> HarnessResult<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let raw = response.text().await?;
        Ok(Self {
            status,
            headers,
            body: parse_body(&raw),
        })
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Status code as a number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Decode the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`harness_common::HarnessError::Serialization`] if the body
    /// does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> HarnessResult<T> {
        Ok(T::deserialize(&self.body)?)
    }

    /// Body as text: the raw string for non-JSON bodies, serialized JSON
    /// otherwise, empty for an empty body.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.body {
            Value::Null => String::new(),
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }

    /// The `message` field of a JSON body, falling back to the text.
    #[must_use]
    pub fn message(&self) -> String {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| self.text(), str::to_string)
    }

    /// Value at a dotted path such as `data.user.email` or `data.0.id`.
    /// The empty path is the whole body.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(&self.body);
        }
        path.split('.').try_fold(&self.body, |value, segment| match value {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => value.get(segment),
        })
    }

    fn unexpected(&self, expected: impl Into<String>, detail: impl Into<String>) -> HarnessError {
        HarnessError::unexpected_response(expected, self.status_code(), detail)
    }

    /// Require an exact status code.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnexpectedResponse`] carrying the body text
    /// when the status differs.
    pub fn expect_status(&self, expected: u16) -> HarnessResult<&Self> {
        if self.status_code() == expected {
            Ok(self)
        } else {
            Err(self.unexpected(format!("status {expected}"), self.text()))
        }
    }

    /// Require a 2xx status and `"success": true` in the body.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnexpectedResponse`] if either check fails.
    pub fn expect_success(&self) -> HarnessResult<&Self> {
        if !self.is_success() {
            return Err(self.unexpected("a successful status", self.message()));
        }
        if self.body.get("success") != Some(&Value::Bool(true)) {
            return Err(self.unexpected("success: true", self.text()));
        }
        Ok(self)
    }

    /// Require an error envelope: the given status, `"success": false`, and a
    /// `message` field containing `pattern` when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnexpectedResponse`] naming the first check
    /// that failed.
    pub fn expect_error(&self, status: u16, pattern: Option<&str>) -> HarnessResult<&Self> {
        self.expect_status(status)?;
        if self.body.get("success") != Some(&Value::Bool(false)) {
            return Err(self.unexpected("success: false", self.text()));
        }
        let Some(message) = self.body.get("message").and_then(Value::as_str) else {
            return Err(self.unexpected("a message field", self.text()));
        };
        match pattern {
            Some(pattern) if !message.contains(pattern) => {
                Err(self.unexpected(format!("message containing '{pattern}'"), message))
            }
            _ => Ok(self),
        }
    }

    /// Require every dotted path in `fields` to be present.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnexpectedResponse`] listing the missing paths.
    pub fn expect_fields(&self, fields: &[&str]) -> HarnessResult<&Self> {
        let missing: Vec<&str> = fields
            .iter()
            .copied()
            .filter(|path| self.field(path).is_none())
            .collect();
        if missing.is_empty() {
            Ok(self)
        } else {
            Err(self.unexpected(
                format!("fields {}", fields.join(", ")),
                format!("missing {}", missing.join(", ")),
            ))
        }
    }

    /// Require each top-level key of `expected` to equal the body's value.
    /// A non-object `expected` must equal the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnexpectedResponse`] for the first mismatch.
    pub fn expect_body_contains(&self, expected: &Value) -> HarnessResult<&Self> {
        let Some(pairs) = expected.as_object() else {
            return if &self.body == expected {
                Ok(self)
            } else {
                Err(self.unexpected(format!("body {expected}"), self.text()))
            };
        };
        for (key, want) in pairs {
            let got = self.body.get(key).unwrap_or(&Value::Null);
            if got != want {
                return Err(self.unexpected(format!("{key} = {want}"), format!("{key} = {got}")));
            }
        }
        Ok(self)
    }

    /// Require the array at `path` to hold exactly `len` items.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnexpectedResponse`] if the path is missing,
    /// is not an array, or has another length.
    pub fn expect_array_length(&self, path: &str, len: usize) -> HarnessResult<&Self> {
        match self.field(path) {
            Some(Value::Array(items)) if items.len() == len => Ok(self),
            Some(Value::Array(items)) => Err(self.unexpected(
                format!("{path} with {len} items"),
                format!("{} items", items.len()),
            )),
            Some(other) => Err(self.unexpected(format!("{path} to be an array"), other.to_string())),
            None => Err(self.unexpected(format!("{path} to be an array"), "missing")),
        }
    }

    /// Validate the body against a registered schema.
    ///
    /// # Errors
    ///
    /// Propagates [`SchemaRegistry::assert_valid`] failures unchanged.
    pub fn expect_schema(&self, registry: &SchemaRegistry, key: &str) -> HarnessResult<&Self> {
        registry.assert_valid(key, &self.body)?;
        Ok(self)
    }
}

fn parse_body(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
