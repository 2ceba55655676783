//! Schema registry: discovers, compiles and applies JSON schemas by key.

use crate::path::render_path;
use harness_common::{HarnessError, HarnessResult};
use jsonschema::{Draft, Validator};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Suffix stripped from schema file names to form keys.
pub const SCHEMA_SUFFIX: &str = ".schema.json";

/// Outcome of validating one value against one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Whether the value conforms
    pub valid: bool,
    /// `<path>: <message>` for every violation, empty when valid
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn failure(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Named collection of compiled schemas.
///
/// Validators are compiled once and shared behind `Arc`s, so `validate` only
/// holds the map lock long enough to look one up.
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: RwLock<BTreeMap<String, Arc<Validator>>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` document in `dir`.
    ///
    /// Documents that fail to parse or compile are logged and skipped. A
    /// missing directory yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] if the directory exists but cannot be listed.
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn load(dir: impl AsRef<Path>) -> HarnessResult<Self> {
        let dir = dir.as_ref();
        let registry = Self::new();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Schemas directory not found");
                return Ok(registry);
            }
            Err(e) => return Err(HarnessError::io(dir, e)),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for path in files {
            let Some(key) = schema_key(&path) else {
                continue;
            };
            match load_document(&key, &path).and_then(|doc| compile(&key, &doc)) {
                Ok(validator) => {
                    registry.insert(key.clone(), validator);
                    info!(schema = %key, "Loaded schema");
                }
                Err(e) => error!(schema = %key, error = %e, "Skipping schema"),
            }
        }

        Ok(registry)
    }

    /// Compile `document` and register it under `key`, replacing any
    /// previous schema with that key.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::SchemaCompilationFailed`] if the document is
    /// not a valid schema; the registry is left unchanged.
    pub fn register_schema(&self, key: impl Into<String>, document: &Value) -> HarnessResult<()> {
        let key = key.into();
        let validator = compile(&key, document)?;
        self.insert(key.clone(), validator);
        debug!(schema = %key, "Registered schema");
        Ok(())
    }

    /// Validate `data` against the schema registered as `key`.
    ///
    /// Every violation is reported, not just the first.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::SchemaNotFound`] if `key` is not registered.
    pub fn validate(&self, key: &str, data: &Value) -> HarnessResult<ValidationResult> {
        let validator = self.schemas.read().get(key).cloned();
        let Some(validator) = validator else {
            return Err(HarnessError::schema_not_found(key, self.list_available()));
        };

        let errors: Vec<String> = validator
            .iter_errors(data)
            .map(|err| {
                let path = render_path(&err.instance_path.to_string(), data);
                format!("{path}: {err}")
            })
            .collect();

        if errors.is_empty() {
            Ok(ValidationResult::success())
        } else {
            Ok(ValidationResult::failure(errors))
        }
    }

    /// Validate and turn any violation into an error.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::SchemaNotFound`] for unknown keys and
    /// [`HarnessError::SchemaValidationFailed`] with every violation when
    /// `data` does not conform.
    pub fn assert_valid(&self, key: &str, data: &Value) -> HarnessResult<()> {
        let result = self.validate(key, data)?;
        if result.valid {
            Ok(())
        } else {
            Err(HarnessError::validation_failed(key, result.errors))
        }
    }

    /// Registered keys in sorted order.
    #[must_use]
    pub fn list_available(&self) -> Vec<String> {
        self.schemas.read().keys().cloned().collect()
    }

    /// Whether `key` is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.schemas.read().contains_key(key)
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Whether no schema is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    fn insert(&self, key: String, validator: Validator) {
        self.schemas.write().insert(key, Arc::new(validator));
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.list_available())
            .finish()
    }
}

/// Key for a schema file: `user.schema.json` -> `user`, `user.json` -> `user`.
/// Files without a `.json` extension are not schemas.
#[must_use]
pub fn schema_key(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let key = name
        .strip_suffix(SCHEMA_SUFFIX)
        .or_else(|| name.strip_suffix(".json"))?;
    (!key.is_empty()).then(|| key.to_string())
}

fn load_document(key: &str, path: &Path) -> HarnessResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| HarnessError::compilation_failed(key, e.to_string()))
}

/// Documents without `$schema` are treated as draft-07.
fn compile(key: &str, document: &Value) -> HarnessResult<Validator> {
    let mut options = jsonschema::options();
    options.should_validate_formats(true);
    if document.get("$schema").is_none() {
        options.with_draft(Draft::Draft7);
    }
    options
        .build(document)
        .map_err(|e| HarnessError::compilation_failed(key, e.to_string()))
}
