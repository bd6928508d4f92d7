//! Submitly server library logic.
//!
//! Three independent API slices (users, subjects, assignments) share one
//! [`AppState`] holding the database pool. Handlers run their database work
//! on the blocking pool and return raw persisted records; the only error
//! translation anywhere is the status-code mapping in each `api_*` module.

pub mod api_assignments;
pub mod api_subjects;
pub mod api_users;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use submitly_db::DbPool;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
}

/// Maximum request body size. The largest legitimate payload here is an
/// assignment description; 256 KiB is generous.
const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// Health check handler.
///
/// Returns `200 OK` with server status and version. Used by load balancers,
/// monitoring, and CI to verify the server is running.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/users",
            post(api_users::create_user_handler).get(api_users::find_user_handler),
        )
        .route("/users/login", post(api_users::login_handler))
        .route(
            "/subjects",
            post(api_subjects::create_subject_handler).get(api_subjects::list_subjects_handler),
        )
        .route(
            "/assignments",
            post(api_assignments::create_assignment_handler)
                .get(api_assignments::list_assignments_handler),
        )
        .route(
            "/assignments/{id}/status",
            patch(api_assignments::update_status_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
