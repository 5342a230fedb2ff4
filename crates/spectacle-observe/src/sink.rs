//! Log destinations.

use serde_json::{Map, Value};
use spectacle_types::WarehouseTable;

use crate::error::ObserveError;

/// A destination that receives whole records.
pub trait LogSink: Send + Sync {
    fn write(&self, record: &Map<String, Value>) -> Result<(), ObserveError>;
}

/// Writes each record as one JSON string through `tracing`
/// (target `spectacle::console`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, record: &Map<String, Value>) -> Result<(), ObserveError> {
        let line = serde_json::to_string(record)?;
        tracing::info!(target: "spectacle::console", "{line}");
        Ok(())
    }
}

/// A warehouse accepting rows already converted by
/// [`crate::warehouse_row`].
pub trait Warehouse: Send + Sync {
    /// Inserts `rows` into `table`, ignoring unknown columns. Returns the
    /// number of rows written.
    fn insert(
        &self,
        table: &WarehouseTable,
        rows: &[Map<String, Value>],
    ) -> Result<usize, ObserveError>;
}
