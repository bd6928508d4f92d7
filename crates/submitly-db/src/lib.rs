//! Database layer for the Submitly backend.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and embedded SQL migrations. Every table in Submitly is created through
//! versioned migrations managed by this crate.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: the service is a single-process backend with
//!   no external database dependency. WAL mode allows concurrent readers
//!   with a single writer, which matches the access pattern.
//! - **`r2d2` connection pool**: provides bounded connection reuse without
//!   manual lifetime management.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, ensuring the schema ships with the server and cannot
//!   drift from the code that depends on it.

mod migrations;
mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool, DbSettings};
