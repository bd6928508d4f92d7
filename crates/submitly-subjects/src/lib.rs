//! Subjects for the Submitly backend.
//!
//! A subject is a named grouping (a course, typically) owned by exactly one
//! user. Subjects are created explicitly, are immutable afterwards, and are
//! never deleted. Listings come back newest-first.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during subject operations.
#[derive(Debug, Error)]
pub enum SubjectError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// A subject owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Record ID (UUID v4).
    pub id: String,
    /// Owning user's ID.
    pub user_id: String,
    /// Display name of the subject.
    pub name: String,
    /// Creation timestamp (RFC 3339 UTC); orders listings.
    pub created_at: String,
}

/// Parameters for creating a subject.
///
/// This struct is the writable-field allow-list: nothing outside it reaches
/// the insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectParams {
    pub user_id: String,
    pub name: String,
}

fn map_row_to_subject(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Creates a new subject and returns the persisted record.
///
/// The owner reference is not pre-checked; a dangling `user_id` surfaces as
/// the store's constraint violation.
pub fn create_subject(
    conn: &Connection,
    params: &CreateSubjectParams,
) -> Result<Subject, SubjectError> {
    let subject = Subject {
        id: Uuid::new_v4().to_string(),
        user_id: params.user_id.clone(),
        name: params.name.clone(),
        created_at: now_utc(),
    };

    conn.execute(
        "INSERT INTO subjects (id, user_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![subject.id, subject.user_id, subject.name, subject.created_at],
    )?;
    Ok(subject)
}

/// Lists all subjects owned by `user_id`, most recent first.
///
/// The owner id is filtered as given — an empty or unknown id simply matches
/// nothing.
pub fn list_subjects(conn: &Connection, user_id: &str) -> Result<Vec<Subject>, SubjectError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, created_at
         FROM subjects WHERE user_id = ?1
         ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map([user_id], map_row_to_subject)?;
    let mut subjects = Vec::new();
    for row in rows {
        subjects.push(row?);
    }
    Ok(subjects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use submitly_db::run_migrations;
    use submitly_users::upsert_user;

    fn setup_db() -> (Connection, String) {
        let conn = Connection::open_in_memory().expect("failed to open in-memory db");
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .expect("failed to enable foreign keys");
        run_migrations(&conn).expect("failed to run migrations");

        let owner = upsert_user(&conn, "owner@example.com", Some("Owner"))
            .expect("failed to create owner");
        (conn, owner.id)
    }

    #[test]
    fn create_and_list_roundtrip() {
        let (conn, owner_id) = setup_db();

        let params = CreateSubjectParams {
            user_id: owner_id.clone(),
            name: "Mathematics".to_string(),
        };
        let created = create_subject(&conn, &params).expect("create failed");
        assert_eq!(created.user_id, owner_id);
        assert_eq!(created.name, "Mathematics");

        let listed = list_subjects(&conn, &owner_id).expect("list failed");
        assert_eq!(listed, vec![created]);
    }

    #[test]
    fn list_orders_newest_first() {
        let (conn, owner_id) = setup_db();

        for name in ["First", "Second", "Third"] {
            let params = CreateSubjectParams {
                user_id: owner_id.clone(),
                name: name.to_string(),
            };
            create_subject(&conn, &params).expect("create failed");
        }

        let listed = list_subjects(&conn, &owner_id).expect("list failed");
        let names: Vec<&str> = listed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Third", "Second", "First"]);
    }

    #[test]
    fn list_scopes_to_owner() {
        let (conn, owner_id) = setup_db();
        let other = upsert_user(&conn, "other@example.com", None).expect("create user failed");

        create_subject(
            &conn,
            &CreateSubjectParams {
                user_id: owner_id.clone(),
                name: "Physics".to_string(),
            },
        )
        .expect("create failed");

        assert!(list_subjects(&conn, &other.id)
            .expect("list failed")
            .is_empty());
        // An empty owner id is just a filter value that matches nothing.
        assert!(list_subjects(&conn, "").expect("list failed").is_empty());
    }

    #[test]
    fn create_with_dangling_owner_is_rejected() {
        let (conn, _) = setup_db();

        let err = create_subject(
            &conn,
            &CreateSubjectParams {
                user_id: "no-such-user".to_string(),
                name: "Ghost".to_string(),
            },
        )
        .expect_err("dangling owner should be rejected by the store");
        match err {
            SubjectError::Database(rusqlite::Error::SqliteFailure(code, _)) => {
                assert_eq!(code.code, rusqlite::ffi::ErrorCode::ConstraintViolation)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
