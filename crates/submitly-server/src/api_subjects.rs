//! Subject endpoints: create and list-by-owner.

use crate::AppState;
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;
use submitly_subjects::{create_subject, list_subjects, CreateSubjectParams, Subject, SubjectError};

/// Maps a [`SubjectError`] to an HTTP status code, logging non-conflict
/// failures.
///
/// A constraint violation (dangling owner reference) → 409, everything
/// else → 500.
fn subject_err_to_status(e: SubjectError) -> StatusCode {
    match e {
        SubjectError::Database(rusqlite::Error::SqliteFailure(code, _))
            if code.code == rusqlite::ffi::ErrorCode::ConstraintViolation =>
        {
            StatusCode::CONFLICT
        }
        err => {
            tracing::error!(error = %err, "subject operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectQuery {
    pub user_id: String,
}

/// POST /subjects
///
/// The request body deserializes straight into [`CreateSubjectParams`]; the
/// param struct is the writable-field allow-list and serde drops anything
/// outside it.
pub async fn create_subject_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(params): Json<CreateSubjectParams>,
) -> Result<Json<Subject>, StatusCode> {
    let pool = state.pool.clone();
    let subject = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection for create_subject");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        create_subject(&conn, &params).map_err(subject_err_to_status)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "create_subject task join error");
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(subject))
}

/// GET /subjects?userId=...
///
/// Lists the owner's subjects, most recent first.
pub async fn list_subjects_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SubjectQuery>,
) -> Result<Json<Vec<Subject>>, StatusCode> {
    let pool = state.pool.clone();
    let subjects = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection for list_subjects");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        list_subjects(&conn, &query.user_id).map_err(subject_err_to_status)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "list_subjects task join error");
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(subjects))
}
