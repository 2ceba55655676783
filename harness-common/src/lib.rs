//! Shared building blocks for the user-management API test harness.
//!
//! This crate provides centralized implementations for:
//! - The harness error taxonomy
//! - HTTP client configuration and building
//! - Tracing subscriber setup
//! - Environment-driven configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod http;
pub mod tracing_config;

pub use config::{ConfigError, Credentials, HarnessConfig};
pub use error::{HarnessError, HarnessResult};
pub use http::{HttpConfig, build_http_client};
pub use tracing_config::{TracingConfig, init_tracing};
