//! Shared proptest generators.

use api_client::{CreateUserRequest, UserRole};
use credential_cache::Role;
use proptest::prelude::*;
use serde_json::Value;

/// Built-in and custom roles.
pub fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Admin),
        Just(Role::User),
        "[a-z]{3,12}".prop_map(|name| Role::from(name.as_str())),
    ]
}

/// Service-side account roles.
pub fn user_role_strategy() -> impl Strategy<Value = UserRole> {
    prop_oneof![Just(UserRole::User), Just(UserRole::Admin)]
}

/// Syntactically valid email addresses.
pub fn email_strategy() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9]{0,15}", "[a-z]{2,10}", "[a-z]{2,4}")
        .prop_map(|(local, domain, tld)| format!("{local}@{domain}.{tld}"))
}

/// Token lifetimes in seconds, spanning values on both sides of the default
/// five-minute margin.
pub fn token_lifetime_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![1u64..=300, 301u64..=3_600, 3_601u64..=604_800]
}

/// Schema keys as derived from file names.
pub fn schema_key_strategy() -> impl Strategy<Value = String> {
    "[a-z][A-Za-z0-9]{2,20}"
}

/// HTTP verbs the client dispatcher does not accept.
pub fn unsupported_verb_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,10}".prop_filter("must not be a supported verb", |verb| {
        !matches!(
            verb.to_ascii_uppercase().as_str(),
            "GET" | "POST" | "PUT" | "DELETE"
        )
    })
}

/// Valid create-user bodies.
pub fn create_user_request_strategy() -> impl Strategy<Value = CreateUserRequest> {
    (
        "[A-Z][a-z]{1,10} [A-Z][a-z]{1,10}",
        email_strategy(),
        "[A-Za-z0-9]{8,20}",
        proptest::option::of(user_role_strategy()),
    )
        .prop_map(|(name, email, password, role)| CreateUserRequest {
            name,
            email,
            password,
            facebook: None,
            avatar: None,
            hobbies: None,
            role,
        })
}

/// JSON objects with an arbitrary subset of the create-user fields.
pub fn partial_user_body_strategy() -> impl Strategy<Value = Value> {
    (
        proptest::option::of("[a-zA-Z ]{0,20}"),
        proptest::option::of(prop_oneof![email_strategy(), "[a-z]{1,10}"]),
        proptest::option::of("[a-z0-9]{0,12}"),
    )
        .prop_map(|(name, email, password)| {
            let mut body = serde_json::Map::new();
            for (field, value) in [("name", name), ("email", email), ("password", password)] {
                if let Some(value) = value {
                    body.insert(field.to_string(), Value::String(value));
                }
            }
            Value::Object(body)
        })
}
