//! Fan-out of log records to the enabled destinations.

use std::sync::Arc;

use spectacle_types::Clock;

use crate::policy::LogSettings;
use crate::record::LogRecord;
use crate::sink::{LogSink, Warehouse};
use crate::warehouse::warehouse_row;

/// Dispatches records to the console sink and, when configured, the
/// warehouse.
#[derive(Clone)]
pub struct Logger {
    console: Arc<dyn LogSink>,
    warehouse: Option<Arc<dyn Warehouse>>,
    clock: Arc<dyn Clock>,
}

impl Logger {
    pub fn new(console: Arc<dyn LogSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            console,
            warehouse: None,
            clock,
        }
    }

    /// Attaches the warehouse used when a tag enables warehouse logging.
    pub fn with_warehouse(mut self, warehouse: Arc<dyn Warehouse>) -> Self {
        self.warehouse = Some(warehouse);
        self
    }

    /// Writes `record` to every destination enabled in `settings`.
    ///
    /// Never fails; sink errors are logged and dropped. The warehouse insert
    /// runs on the blocking pool so a busy database never stalls the
    /// runtime.
    pub async fn log(&self, settings: &LogSettings, mut record: LogRecord) {
        if !settings.is_enabled() {
            return;
        }

        record.trace_id = settings.trace_id.clone();
        let fields = match record.to_map() {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize log record");
                return;
            }
        };

        if settings.console {
            if let Err(e) = self.console.write(&fields) {
                tracing::warn!(error = %e, "console log sink failed");
            }
        }

        let Some(table) = settings.warehouse.clone() else {
            return;
        };
        let Some(warehouse) = self.warehouse.clone() else {
            tracing::debug!("warehouse logging enabled by tag but no warehouse is configured");
            return;
        };

        let row = warehouse_row(&fields, self.clock.now_millis());
        let table_id = table.table_id.clone();
        let inserted =
            tokio::task::spawn_blocking(move || warehouse.insert(&table, &[row])).await;

        match inserted {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, table_id = %table_id, "warehouse log sink failed");
            }
            Err(e) => {
                tracing::warn!(error = %e, table_id = %table_id, "warehouse log task join error");
            }
        }
    }
}
