//! User endpoints: signup upsert, login find-or-create, lookup by email.

use crate::AppState;
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;
use submitly_users::{find_by_email, find_or_create, upsert_user, User, UserError};

/// Maps a [`UserError`] to an HTTP status code, logging the failure.
///
/// User operations resolve duplicate emails internally, so anything that
/// reaches this point is a store-level failure.
fn user_err_to_status(e: UserError) -> StatusCode {
    tracing::error!(error = %e, "user operation failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

#[derive(Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct UserQuery {
    pub email: String,
}

/// POST /users
///
/// Create-or-update by email; returns the resulting user record.
pub async fn create_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<User>, StatusCode> {
    let pool = state.pool.clone();
    let user = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection for create_user");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        upsert_user(&conn, &payload.email, payload.name.as_deref()).map_err(user_err_to_status)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "create_user task join error");
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(user))
}

/// POST /users/login
///
/// Find-or-create by email; an existing user comes back unchanged.
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<User>, StatusCode> {
    let pool = state.pool.clone();
    let user = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection for login");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        find_or_create(&conn, &payload.email, payload.name.as_deref())
            .map_err(user_err_to_status)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "login task join error");
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(user))
}

/// GET /users?email=...
///
/// Returns the matching user record, or JSON `null` when no user has this
/// email — a miss is not an error.
pub async fn find_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Option<User>>, StatusCode> {
    let pool = state.pool.clone();
    let user = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection for find_user");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        find_by_email(&conn, &query.email).map_err(user_err_to_status)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "find_user task join error");
        StatusCode::INTERNAL_SERVER_ERROR
    })??;

    Ok(Json(user))
}
