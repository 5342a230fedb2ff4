//! Schema versioning for the log store.
//!
//! Schema steps are embedded with `include_str!` and recorded by name in
//! `_spectacle_migrations`. A step that fails leaves no partial schema behind.

use std::collections::HashSet;

use rusqlite::Connection;
use thiserror::Error;

const TRACKING_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS _spectacle_migrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);";

struct SchemaStep {
    name: &'static str,
    sql: &'static str,
}

/// Ordered schema steps. Append only.
const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        name: "000_init",
        sql: include_str!("migrations/000_init.sql"),
    },
    SchemaStep {
        name: "001_tag_logs",
        sql: include_str!("migrations/001_tag_logs.sql"),
    },
];

#[derive(Debug, Error)]
pub enum MigrationError {
    /// A schema step (or the tracking table bootstrap) failed to apply.
    #[error("migration '{name}' failed: {source}")]
    ExecutionFailed {
        name: String,
        source: rusqlite::Error,
    },

    #[error("failed to check migration state: {0}")]
    StateQuery(rusqlite::Error),
}

/// Names of the schema steps already recorded on this connection.
pub fn applied_migrations(conn: &Connection) -> Result<HashSet<String>, MigrationError> {
    ensure_tracking_table(conn)?;
    let mut stmt = conn
        .prepare("SELECT name FROM _spectacle_migrations")
        .map_err(MigrationError::StateQuery)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(MigrationError::StateQuery)?
        .collect::<Result<HashSet<_>, _>>()
        .map_err(MigrationError::StateQuery)?;
    Ok(names)
}

/// Brings the schema up to date and returns the number of steps applied.
///
/// # Errors
///
/// Returns `MigrationError` when the tracking table cannot be read or a step
/// fails. The failing step is rolled back; earlier steps stay committed.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    apply_steps(conn, SCHEMA_STEPS)
}

fn ensure_tracking_table(conn: &Connection) -> Result<(), MigrationError> {
    conn.execute_batch(TRACKING_TABLE_SQL)
        .map_err(|source| MigrationError::ExecutionFailed {
            name: "_spectacle_migrations".to_string(),
            source,
        })
}

fn apply_steps(conn: &Connection, steps: &[SchemaStep]) -> Result<usize, MigrationError> {
    let done = applied_migrations(conn)?;
    let pending: Vec<&SchemaStep> = steps
        .iter()
        .filter(|step| !done.contains(step.name))
        .collect();

    for step in &pending {
        tracing::info!(migration = step.name, "applying schema step");
        apply_step(conn, step).map_err(|source| MigrationError::ExecutionFailed {
            name: step.name.to_string(),
            source,
        })?;
    }

    tracing::debug!(
        applied = pending.len(),
        skipped = steps.len() - pending.len(),
        "schema up to date"
    );
    Ok(pending.len())
}

fn apply_step(conn: &Connection, step: &SchemaStep) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(step.sql)?;
    tx.execute(
        "INSERT INTO _spectacle_migrations (name) VALUES (?1)",
        [step.name],
    )?;
    tx.commit()
}
