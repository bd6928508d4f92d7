//! Assignment endpoints: create, list-by-owner with subject, status update.

use crate::AppState;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;
use submitly_assignments::{
    create_assignment, list_by_user, update_status, Assignment, AssignmentError,
    AssignmentWithSubject, CreateAssignmentParams,
};

/// Maps an [`AssignmentError`] to an HTTP status code, logging unexpected
/// failures.
///
/// `NotFound` → 404, `InvalidDueDate` → 400, constraint violation (dangling
/// owner or subject reference) → 409, everything else → 500.
fn assignment_err_to_status(e: AssignmentError) -> StatusCode {
    match e {
        AssignmentError::NotFound(_) => StatusCode::NOT_FOUND,
        AssignmentError::InvalidDueDate(_) => StatusCode::BAD_REQUEST,
        AssignmentError::Database(rusqlite::Error::SqliteFailure(code, _))
            if code.code == rusqlite::ffi::ErrorCode::ConstraintViolation =>
        {
            StatusCode::CONFLICT
        }
        err => {
            tracing::error!(error = %err, "assignment operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentQuery {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// POST /assignments
///
/// The request body deserializes straight into [`CreateAssignmentParams`]
/// (the writable-field allow-list). An unparseable `dueDate` fails the whole
/// request with 400 and writes nothing.
pub async fn create_assignment_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(params): Json<CreateAssignmentParams>,
) -> Result<Json<Assignment>, StatusCode> {
    let pool = state.pool.clone();
    let assignment = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection for create_assignment");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        create_assignment(&conn, &params).map_err(assignment_err_to_status)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "create_assignment task join error");
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(assignment))
}

/// GET /assignments?userId=...
///
/// Lists the owner's assignments, due date ascending, each with its
/// subject's full record inlined.
pub async fn list_assignments_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<AssignmentQuery>,
) -> Result<Json<Vec<AssignmentWithSubject>>, StatusCode> {
    let pool = state.pool.clone();
    let assignments = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection for list_assignments");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        list_by_user(&conn, &query.user_id).map_err(assignment_err_to_status)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "list_assignments task join error");
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(assignments))
}

/// PATCH /assignments/{id}/status
///
/// Overwrites the status field and returns the updated record; 404 when the
/// id does not exist. No vocabulary is enforced.
pub async fn update_status_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Assignment>, StatusCode> {
    let pool = state.pool.clone();
    let assignment = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection for update_status");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        update_status(&conn, &id, &payload.status).map_err(assignment_err_to_status)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "update_status task join error");
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(assignment))
}
