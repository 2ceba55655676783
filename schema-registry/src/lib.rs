//! JSON schema registry for response-shape validation.
//!
//! Schemas are compiled once from a directory of `<key>.schema.json` files
//! and applied by key. Violations come back as `<path>: <message>` strings,
//! with `root` standing for the top level of the validated value.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod global;
pub mod path;
pub mod registry;

pub use global::{global, init_global};
pub use path::render_path;
pub use registry::{SCHEMA_SUFFIX, SchemaRegistry, ValidationResult, schema_key};
