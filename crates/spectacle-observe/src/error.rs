//! Error types for the logging layer.

/// Errors a log sink can report. The [`crate::Logger`] swallows them.
#[derive(Debug, thiserror::Error)]
pub enum ObserveError {
    /// A database operation failed.
    #[error("log store database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No connection could be checked out of the pool.
    #[error("log store pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// JSON serialization failed.
    #[error("log serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
