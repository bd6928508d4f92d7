//! Assignments for the Submitly backend.
//!
//! An assignment belongs to one user and references one subject. It carries
//! a required title and due date, an optional description, and a free-form
//! status string mutated through a dedicated update path. Listings come back
//! in due-date order with the subject record attached.
//!
//! Status has no state machine: any string is accepted at any time, and no
//! history is kept. The starting value is the schema default `"pending"`.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use submitly_subjects::Subject;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during assignment operations.
#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("assignment not found: {0}")]
    NotFound(String),
    #[error("unparseable due date: {0:?}")]
    InvalidDueDate(String),
}

/// An assignment owned by a user, attached to a subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Record ID (UUID v4).
    pub id: String,
    /// Assignment title.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Due date, normalized to RFC 3339 UTC; orders listings.
    pub due_date: String,
    /// Free-form status string.
    pub status: String,
    /// Owning user's ID.
    pub user_id: String,
    /// Referenced subject's ID.
    pub subject_id: String,
    /// Creation timestamp (RFC 3339 UTC).
    pub created_at: String,
}

/// An assignment with its subject's full record inlined, as returned by
/// [`list_by_user`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentWithSubject {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub subject: Subject,
}

/// Parameters for creating an assignment.
///
/// This struct is the writable-field allow-list. `due_date` is the raw input
/// string; it is parsed (and the operation fails) inside
/// [`create_assignment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentParams {
    pub title: String,
    pub description: Option<String>,
    pub due_date: String,
    pub user_id: String,
    pub subject_id: String,
}

fn map_row_to_assignment(row: &Row<'_>) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: row.get(3)?,
        status: row.get(4)?,
        user_id: row.get(5)?,
        subject_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a due-date input string into a UTC timestamp.
///
/// Accepts an RFC 3339 date-time, or a bare `YYYY-MM-DD` date taken as UTC
/// midnight. Anything else is `InvalidDueDate`.
fn parse_due_date(input: &str) -> Result<DateTime<Utc>, AssignmentError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(AssignmentError::InvalidDueDate(input.to_string()))
}

/// Creates a new assignment and returns the persisted record.
///
/// The due date is parsed before anything touches the store, so an
/// unparseable value fails the whole operation with no row written. An
/// omitted description is stored as NULL. Owner and subject references are
/// not pre-checked; dangling ids surface as the store's constraint
/// violation.
pub fn create_assignment(
    conn: &Connection,
    params: &CreateAssignmentParams,
) -> Result<Assignment, AssignmentError> {
    let due_date = parse_due_date(&params.due_date)?;

    let assignment = Assignment {
        id: Uuid::new_v4().to_string(),
        title: params.title.clone(),
        description: params.description.clone(),
        due_date: due_date.to_rfc3339_opts(SecondsFormat::Millis, true),
        status: "pending".to_string(),
        user_id: params.user_id.clone(),
        subject_id: params.subject_id.clone(),
        created_at: now_utc(),
    };

    conn.execute(
        "INSERT INTO assignments
            (id, title, description, due_date, user_id, subject_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            assignment.id,
            assignment.title,
            assignment.description,
            assignment.due_date,
            assignment.user_id,
            assignment.subject_id,
            assignment.created_at,
        ],
    )?;
    Ok(assignment)
}

/// Lists all assignments owned by `user_id`, due date ascending, each with
/// its subject's full record attached.
pub fn list_by_user(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<AssignmentWithSubject>, AssignmentError> {
    let mut stmt = conn.prepare(
        "SELECT
            a.id, a.title, a.description, a.due_date, a.status,
            a.user_id, a.subject_id, a.created_at,
            s.id, s.user_id, s.name, s.created_at
         FROM assignments a
         JOIN subjects s ON s.id = a.subject_id
         WHERE a.user_id = ?1
         ORDER BY a.due_date ASC",
    )?;

    let rows = stmt.query_map([user_id], |row| {
        let assignment = map_row_to_assignment(row)?;
        let subject = Subject {
            id: row.get(8)?,
            user_id: row.get(9)?,
            name: row.get(10)?,
            created_at: row.get(11)?,
        };
        Ok(AssignmentWithSubject {
            assignment,
            subject,
        })
    })?;

    let mut assignments = Vec::new();
    for row in rows {
        assignments.push(row?);
    }
    Ok(assignments)
}

/// Overwrites the status of the assignment with the given id and returns the
/// updated record.
///
/// No vocabulary is enforced and no existence pre-check is made: a missing
/// id surfaces as `NotFound` straight from the update itself.
pub fn update_status(
    conn: &Connection,
    id: &str,
    status: &str,
) -> Result<Assignment, AssignmentError> {
    conn.query_row(
        "UPDATE assignments SET status = ?2 WHERE id = ?1
         RETURNING id, title, description, due_date, status,
                   user_id, subject_id, created_at",
        params![id, status],
        map_row_to_assignment,
    )
    .optional()?
    .ok_or_else(|| AssignmentError::NotFound(id.to_string()))
}
