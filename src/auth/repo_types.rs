use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub email: String,              // lowercased, unique
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    pub display_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Input for `User::create`. A missing id is generated.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Option<Uuid>,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
}

/// Unique lookup key for a user.
#[derive(Debug, Clone, Copy)]
pub enum UserWhere<'a> {
    Id(Uuid),
    Email(&'a str),
}
