//! User accounts for the Submitly backend.
//!
//! A user is identified by a unique email address; the display name is
//! optional. Users are created on first signup or first login and are never
//! deleted. Both entry points resolve duplicate emails through the store's
//! uniqueness constraint rather than a read-then-write sequence, so
//! concurrent first logins with the same email cannot produce duplicate
//! rows.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A registered user.
///
/// Serialized field names are camelCase to preserve the service's existing
/// JSON contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Record ID (UUID v4).
    pub id: String,
    /// Unique email address; the identity key.
    pub email: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Creation timestamp (RFC 3339 UTC).
    pub created_at: String,
}

fn map_row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn now_utc() -> String {
    // Microsecond precision keeps creation-order sorts stable in tests and
    // in rapid successive inserts.
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Creates a user, or updates the existing one with the same email.
///
/// A single upsert keyed on the unique email index: a repeat signup never
/// raises a duplicate error and never produces a second row. When `name` is
/// supplied it replaces the stored name; when it is absent the stored name
/// is left untouched.
pub fn upsert_user(
    conn: &Connection,
    email: &str,
    name: Option<&str>,
) -> Result<User, UserError> {
    let user = conn.query_row(
        "INSERT INTO users (id, email, name, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(email) DO UPDATE SET
             name = COALESCE(excluded.name, users.name)
         RETURNING id, email, name, created_at",
        params![Uuid::new_v4().to_string(), email, name, now_utc()],
        map_row_to_user,
    )?;
    Ok(user)
}

/// Looks up a user by email.
///
/// Returns `Ok(None)` when no user has this email; a miss is not an error.
pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>, UserError> {
    let user = conn
        .query_row(
            "SELECT id, email, name, created_at FROM users WHERE email = ?1",
            [email],
            map_row_to_user,
        )
        .optional()?;
    Ok(user)
}

/// Returns the user with this email, creating it first if absent.
///
/// Implemented as a single conditional insert-or-return against the unique
/// email index (the `DO UPDATE` arm is a no-op that exists so `RETURNING`
/// yields the surviving row). An existing user comes back unchanged — the
/// supplied `name` only applies to a fresh insert.
pub fn find_or_create(
    conn: &Connection,
    email: &str,
    name: Option<&str>,
) -> Result<User, UserError> {
    let user = conn.query_row(
        "INSERT INTO users (id, email, name, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(email) DO UPDATE SET
             email = excluded.email
         RETURNING id, email, name, created_at",
        params![Uuid::new_v4().to_string(), email, name, now_utc()],
        map_row_to_user,
    )?;
    Ok(user)
}
