//! Local storage for the Spectacle forwarder.
//!
//! Backs the warehouse log sink: a WAL-mode SQLite pool (via `r2d2`) and
//! embedded migrations for the `tag_logs` table.

mod migrations;
mod pool;

pub use migrations::{applied_migrations, run_migrations, MigrationError};
pub use pool::{create_pool, open_log_store, DbPool, DbRuntimeSettings, PoolError};
