//! Test fixtures with sample data.
//!
//! Payload factories produce unique, valid request bodies; the `invalid`
//! module holds bodies the service must reject; the `*_body` functions build
//! responses shaped like the service's, for mock servers.

use api_client::{CreateUserRequest, UpdateProfileRequest, UpdateUserRequest, UserRole};
use chrono::Utc;
use credential_cache::Role;
use harness_common::Credentials;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde_json::{Value, json};

/// Password the service seeds every sample account with.
pub const DEFAULT_PASSWORD: &str = "password123";

/// A unique address: `<prefix>_<epoch millis>_<random>@example.com`.
#[must_use]
pub fn random_email(prefix: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("{prefix}_{}_{suffix}@example.com", Utc::now().timestamp_millis())
}

/// Random lowercase alphanumeric string of `len` characters.
#[must_use]
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

fn random_avatar() -> String {
    let img: u8 = rand::thread_rng().gen_range(0..70);
    format!("https://i.pravatar.cc/150?img={img}")
}

/// Valid `POST /users.php` body for a new regular user.
#[must_use]
pub fn create_user_payload() -> CreateUserRequest {
    CreateUserRequest {
        name: format!("Test User {}", random_string(5)),
        email: random_email("newuser"),
        password: DEFAULT_PASSWORD.to_string(),
        facebook: Some("https://facebook.com/testuser".to_string()),
        avatar: Some(random_avatar()),
        hobbies: Some("Testing, Coding, Automation".to_string()),
        role: Some(UserRole::User),
    }
}

/// Valid `PUT /users.php` body for user `id`.
#[must_use]
pub fn update_user_payload(id: i64) -> UpdateUserRequest {
    UpdateUserRequest {
        id,
        name: format!("Updated User {}", random_string(5)),
        email: random_email("updated"),
        facebook: Some("https://facebook.com/updated".to_string()),
        avatar: Some(random_avatar()),
        hobbies: Some("Reading, Travel, Photography".to_string()),
        role: Some(UserRole::User),
    }
}

/// Valid `PUT /profile.php` body.
#[must_use]
pub fn update_profile_payload() -> UpdateProfileRequest {
    UpdateProfileRequest {
        name: format!("My Updated Name {}", random_string(5)),
        facebook: Some("https://facebook.com/myprofile".to_string()),
        avatar: Some(random_avatar()),
        hobbies: Some("Coding, Music, Travel".to_string()),
    }
}

/// Bodies the service must reject.
pub mod invalid {
    use super::{DEFAULT_PASSWORD, random_email};
    use serde_json::{Value, json};

    /// Create-user body without `name`.
    #[must_use]
    pub fn missing_required_field() -> Value {
        json!({ "email": random_email("test"), "password": DEFAULT_PASSWORD })
    }

    /// Create-user body with a malformed email.
    #[must_use]
    pub fn invalid_email() -> Value {
        json!({ "name": "Test User", "email": "not-an-email", "password": DEFAULT_PASSWORD })
    }

    /// Create-user body with every field empty.
    #[must_use]
    pub fn empty_fields() -> Value {
        json!({ "name": "", "email": "", "password": "" })
    }
}

/// Default admin/user accounts of the demo service.
#[must_use]
pub fn default_accounts() -> Vec<(Role, Credentials)> {
    vec![
        (Role::Admin, Credentials::new("admin@example.com", "password")),
        (Role::User, Credentials::new("john.doe@example.com", "password")),
    ]
}

/// A user record as the service returns it.
#[must_use]
pub fn user_json(id: i64, role: UserRole) -> Value {
    json!({
        "id": id,
        "name": format!("User {id}"),
        "email": format!("user{id}@example.com"),
        "facebook": null,
        "avatar": null,
        "hobbies": null,
        "role": role,
        "is_active": 1,
        "created_at": "2024-01-01 00:00:00",
        "updated_at": "2024-01-01 00:00:00"
    })
}

/// Successful login response.
#[must_use]
pub fn login_response_body(token: &str, expires_in: u64, role: UserRole) -> Value {
    json!({
        "success": true,
        "data": {
            "token": token,
            "expires_in": expires_in,
            "user": user_json(1, role)
        }
    })
}

/// `GET /users.php` response with `count` users, the first one an admin.
#[must_use]
pub fn user_list_body(count: i64) -> Value {
    let users: Vec<Value> = (1..=count)
        .map(|id| user_json(id, if id == 1 { UserRole::Admin } else { UserRole::User }))
        .collect();
    json!({ "success": true, "users": users })
}

/// Single-user response, as returned by create and update.
#[must_use]
pub fn user_response_body(id: i64, message: &str) -> Value {
    json!({ "success": true, "message": message, "user": user_json(id, UserRole::User) })
}

/// `GET /profile.php` response.
#[must_use]
pub fn profile_body(id: i64, role: UserRole) -> Value {
    json!({ "success": true, "profile": user_json(id, role) })
}

/// Error response with `message`.
#[must_use]
pub fn error_body(message: &str) -> Value {
    json!({ "success": false, "message": message })
}

/// `POST /reset.php` response.
#[must_use]
pub fn reset_body() -> Value {
    json!({
        "success": true,
        "reset": {
            "message": "Database reset successfully",
            "sample_data": {
                "users": 3,
                "default_password": "password",
                "accounts": [
                    { "email": "admin@example.com", "role": "admin" },
                    { "email": "john.doe@example.com", "role": "user" }
                ]
            }
        }
    })
}
