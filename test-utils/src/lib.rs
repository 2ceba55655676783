//! Shared test utilities for the user-management API harness.
//!
//! This crate provides:
//! - Proptest generators for roles, payloads and token lifetimes
//! - Payload factories and sample response bodies
//! - A counting mock authenticator for cache tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use fixtures::{random_email, random_string};
pub use generators::*;
pub use mocks::MockAuthenticator;
