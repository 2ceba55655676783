//! Property-based and directory-scan tests for the schema registry.

use harness_common::HarnessError;
use proptest::prelude::*;
use schema_registry::{SchemaRegistry, init_global};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

fn create_user_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name", "email", "password"],
        "properties": {
            "name": { "type": "string" },
            "email": { "type": "string", "format": "email" },
            "password": { "type": "string" }
        }
    })
}

fn bundled_schemas_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../data/schemas")
}

#[test]
fn test_missing_directory_yields_empty_registry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = SchemaRegistry::load(dir.path().join("does-not-exist")).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_malformed_schema_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("createUser.schema.json"),
        create_user_schema().to_string(),
    )
    .unwrap();
    fs::write(dir.path().join("broken.schema.json"), "{ \"type\": ").unwrap();
    fs::write(dir.path().join("badType.schema.json"), r#"{"type": 12}"#).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();

    let registry = SchemaRegistry::load(dir.path()).unwrap();

    assert_eq!(registry.list_available(), vec!["createUser"]);
    assert!(!registry.contains("broken"));
    assert!(!registry.contains("badType"));
}

#[test]
fn test_plain_json_extension_accepted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("error.json"), r#"{"type": "object"}"#).unwrap();

    let registry = SchemaRegistry::load(dir.path()).unwrap();
    assert_eq!(registry.list_available(), vec!["error"]);
}

#[test]
fn test_round_trip_required_fields() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("createUser.schema.json"),
        create_user_schema().to_string(),
    )
    .unwrap();
    let registry = SchemaRegistry::load(dir.path()).unwrap();

    let valid = json!({"name": "a", "email": "a@b.com", "password": "x"});
    let result = registry.validate("createUser", &valid).unwrap();
    assert!(result.valid);
    assert!(result.errors.is_empty());

    let missing_name = json!({"email": "a@b.com", "password": "x"});
    let result = registry.validate("createUser", &missing_name).unwrap();
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("root: "));
    assert!(result.errors[0].contains("'name'") || result.errors[0].contains("\"name\""));
}

#[test]
fn test_unknown_schema_lists_loaded_keys() {
    let registry = SchemaRegistry::load(bundled_schemas_dir()).unwrap();
    assert!(!registry.is_empty());

    let err = registry.validate("nonexistent_key", &json!({})).unwrap_err();
    let HarnessError::SchemaNotFound { available, .. } = &err else {
        panic!("unexpected error: {err}");
    };
    assert!(available.contains(&"loginResponse".to_string()));
    assert!(err.to_string().contains("loginResponse"));
}

#[test]
fn test_bundled_schemas_compile() {
    let registry = SchemaRegistry::load(bundled_schemas_dir()).unwrap();
    for key in [
        "errorResponse",
        "loginResponse",
        "profileResponse",
        "resetResponse",
        "user",
        "userList",
        "userResponse",
    ] {
        assert!(registry.contains(key), "missing bundled schema {key}");
    }
}

#[test]
fn test_nested_paths_in_login_response() {
    let registry = SchemaRegistry::load(bundled_schemas_dir()).unwrap();
    let body = json!({
        "success": true,
        "data": {
            "token": "",
            "expires_in": 86400,
            "user": { "id": 1, "name": "Admin", "email": "not-an-email", "role": "admin" }
        }
    });

    let result = registry.validate("loginResponse", &body).unwrap();

    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.starts_with("data.token: ")));
    assert!(result.errors.iter().any(|e| e.starts_with("data.user.email: ")));
}

#[test]
fn test_array_paths_in_user_list() {
    let registry = SchemaRegistry::load(bundled_schemas_dir()).unwrap();
    let body = json!({
        "success": true,
        "users": [
            { "id": 1, "name": "Admin", "email": "admin@example.com", "role": "admin" },
            { "id": 2, "name": "John", "email": "john@example.com", "role": "superuser" }
        ]
    });

    let result = registry.validate("userList", &body).unwrap();

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("users[1].role: "));
}

#[test]
fn test_global_initialises_once() {
    let first = init_global(bundled_schemas_dir()).unwrap();
    let second = init_global("/definitely/not/here").unwrap();

    assert!(std::ptr::eq(first, second));
    assert!(second.contains("loginResponse"));
    assert!(schema_registry::global().is_some());
}

fn user_like_strategy() -> impl Strategy<Value = Value> {
    (
        proptest::option::of("[a-zA-Z ]{1,20}"),
        proptest::option::of(prop_oneof![
            "[a-z]{1,10}@[a-z]{1,10}\\.com",
            "[a-z]{1,10}",
        ]),
        proptest::option::of("[a-z0-9]{1,12}"),
    )
        .prop_map(|(name, email, password)| {
            let mut body = serde_json::Map::new();
            if let Some(name) = name {
                body.insert("name".to_string(), Value::String(name));
            }
            if let Some(email) = email {
                body.insert("email".to_string(), Value::String(email));
            }
            if let Some(password) = password {
                body.insert("password".to_string(), Value::String(password));
            }
            Value::Object(body)
        })
}

// Property: Idempotent Validation
// *For any* value, asserting it twice SHALL either succeed both times or fail
// both times with an identical violation list.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_assert_valid_is_idempotent(data in user_like_strategy()) {
        let registry = SchemaRegistry::new();
        registry.register_schema("createUser", &create_user_schema()).unwrap();

        let first = registry.assert_valid("createUser", &data);
        let second = registry.assert_valid("createUser", &data);

        match (first, second) {
            (Ok(()), Ok(())) => {}
            (
                Err(HarnessError::SchemaValidationFailed { violations: a, .. }),
                Err(HarnessError::SchemaValidationFailed { violations: b, .. }),
            ) => {
                prop_assert!(!a.is_empty());
                prop_assert_eq!(a, b);
            }
            (a, b) => prop_assert!(false, "inconsistent results: {:?} / {:?}", a, b),
        }
    }

    #[test]
    fn prop_each_missing_field_reported(data in user_like_strategy()) {
        let registry = SchemaRegistry::new();
        registry.register_schema("createUser", &create_user_schema()).unwrap();

        let result = registry.validate("createUser", &data).unwrap();
        for field in ["name", "email", "password"] {
            if data.get(field).is_none() {
                prop_assert!(
                    result.errors.iter().any(|e| e.starts_with("root: ") && e.contains(field)),
                    "no violation for missing {}: {:?}", field, result.errors
                );
            }
        }
        prop_assert_eq!(result.valid, result.errors.is_empty());
    }
}
