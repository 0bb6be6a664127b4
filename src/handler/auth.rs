//! User model and password helpers
//!
//! Passwords are stored as unsalted SHA-256 hex digests. That is weak and is
//! kept only for compatibility with existing `users.json` files.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::RepositoryError;
use crate::repository::{FieldKind, FieldRule, Filter, Repository, Schema};
use crate::store::Entity;

pub const USERS_COLLECTION: &str = "users";

pub fn user_schema() -> Schema {
    Schema::new()
        .field(
            "username",
            FieldRule::new(FieldKind::String).required().unique(),
        )
        .field("password", FieldRule::new(FieldKind::String).required())
}

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Create a user from a sign-up payload.
///
/// Only `username` and `password` are kept. A string password is hashed;
/// any other non-null value is passed through so validation rejects it.
pub async fn insert_user(
    users: &Repository,
    input: &Map<String, Value>,
) -> Result<Entity, RepositoryError> {
    let mut user = Entity::new();
    if let Some(username) = input.get("username").filter(|v| !v.is_null()) {
        user.insert("username".to_string(), username.clone());
    }
    match input.get("password") {
        Some(Value::String(password)) => {
            user.insert("password".to_string(), Value::String(hash_password(password)));
        }
        Some(Value::Null) | None => {}
        Some(other) => {
            user.insert("password".to_string(), other.clone());
        }
    }
    users.create_one(user).await
}

pub async fn verify_user(users: &Repository, username: &str, password: &str) -> Option<Entity> {
    let mut filter = Filter::new();
    filter.insert("username".to_string(), Value::from(username));
    filter.insert("password".to_string(), Value::from(hash_password(password)));
    users.find_one(&filter).await
}
