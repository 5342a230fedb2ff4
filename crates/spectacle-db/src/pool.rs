//! SQLite connection pool for the warehouse log store.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

use crate::migrations::{run_migrations, MigrationError};

/// Connection tuning for the log store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// How long a writer waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Upper bound on pooled connections.
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 4,
        }
    }
}

/// Pool of log store connections.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors raised while opening the log store.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to create log store pool: {0}")]
    PoolInit(#[from] r2d2::Error),

    #[error("failed to migrate log store: {0}")]
    Migration(#[from] MigrationError),
}

/// Creates a pool over `db_path` with WAL journaling and the configured
/// busy timeout applied to every connection.
///
/// `:memory:` gives each pooled connection its own private database, so
/// callers that need shared in-memory state must use `pool_max_size: 1`.
///
/// # Errors
///
/// Returns `PoolError::PoolInit` if the first connection cannot be opened
/// or initialized.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(move |conn| init_connection(conn, settings.busy_timeout_ms));

    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .build(manager)?;

    tracing::debug!(
        path = db_path,
        max_size = settings.pool_max_size,
        "created log store pool"
    );
    Ok(pool)
}

/// Creates the pool and brings the schema up to date.
///
/// # Errors
///
/// Returns `PoolError` if the pool cannot be created or a migration fails.
pub fn open_log_store(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let pool = create_pool(db_path, settings)?;
    let applied = {
        let conn = pool.get()?;
        run_migrations(&conn)?
    };
    if applied > 0 {
        tracing::info!(count = applied, path = db_path, "applied log store migrations");
    }
    Ok(pool)
}

fn init_connection(conn: &mut Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    // in-memory databases answer "memory"
    if journal_mode != "wal" && journal_mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("journal mode stuck at {journal_mode}, expected wal")),
        ));
    }
    conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms))
}
