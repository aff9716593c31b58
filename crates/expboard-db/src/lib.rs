//! Experiment board database layer.
//!
//! SQLite persistence for experiments: connection pool, schema migrations
//! and the query functions the domain layer builds on.

pub mod migrations;
pub mod pool;
pub mod queries;

pub use pool::{DbError, DbPool, DbResult};

use std::path::Path;

/// Conventional database location, relative to the project directory.
pub const DEFAULT_DB_PATH: &str = "data/kanban.db";

/// Open the database at `path` and bring its schema up to date.
pub fn init_pool(path: &Path) -> DbResult<DbPool> {
    let pool = DbPool::open(path)?;
    migrations::run_migrations(&pool)?;
    tracing::info!(path = %path.display(), "Database ready");
    Ok(pool)
}

/// Open a migrated in-memory database.
pub fn init_memory_pool() -> DbResult<DbPool> {
    let pool = DbPool::in_memory()?;
    migrations::run_migrations(&pool)?;
    Ok(pool)
}
