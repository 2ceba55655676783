//! Process-wide registry.
//!
//! The first successful [`init_global`] compiles the schema directory; every
//! later call returns that same registry regardless of the directory passed.
//! Tests that need their own schemas build a [`SchemaRegistry`] directly.

use crate::registry::SchemaRegistry;
use harness_common::HarnessResult;
use once_cell::sync::OnceCell;
use std::path::Path;
use tracing::debug;

static GLOBAL: OnceCell<SchemaRegistry> = OnceCell::new();

/// Load `dir` into the process-wide registry on first call.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be listed. A failed
/// initialisation leaves the registry unset so a later call can retry.
pub fn init_global(dir: impl AsRef<Path>) -> HarnessResult<&'static SchemaRegistry> {
    let dir = dir.as_ref();
    if let Some(existing) = GLOBAL.get() {
        debug!(dir = %dir.display(), "Schema registry already initialised");
        return Ok(existing);
    }
    GLOBAL.get_or_try_init(|| SchemaRegistry::load(dir))
}

/// The process-wide registry, if initialised.
#[must_use]
pub fn global() -> Option<&'static SchemaRegistry> {
    GLOBAL.get()
}
