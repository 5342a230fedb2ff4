//! Warehouse row conversion and the SQLite-backed warehouse.

use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value};
use spectacle_db::DbPool;
use spectacle_types::WarehouseTable;

use crate::error::ObserveError;
use crate::sink::Warehouse;

/// Record key → warehouse column. Keys not listed keep their name.
pub const WAREHOUSE_KEY_MAP: &[(&str, &str)] = &[
    ("Name", "tag_name"),
    ("Type", "type"),
    ("TraceId", "trace_id"),
    ("EventName", "event_name"),
    ("RequestMethod", "request_method"),
    ("RequestUrl", "request_url"),
    ("RequestBody", "request_body"),
    ("ResponseStatusCode", "response_status_code"),
    ("ResponseHeaders", "response_headers"),
    ("ResponseBody", "response_body"),
];

/// Columns stored as JSON text.
const STRINGIFIED_COLUMNS: &[&str] = &["request_body", "response_headers", "response_body"];

/// Columns of `tag_logs` filled from a row, in insert order.
const ROW_COLUMNS: &[&str] = &[
    "tag_name",
    "type",
    "trace_id",
    "event_name",
    "request_method",
    "request_url",
    "request_body",
    "response_status_code",
    "response_headers",
    "response_body",
    "timestamp",
];

/// Converts a record into a warehouse row: renames keys, adds `timestamp`
/// and serializes nested values to JSON strings.
pub fn warehouse_row(record: &Map<String, Value>, timestamp_ms: i64) -> Map<String, Value> {
    let mut row = Map::with_capacity(record.len() + 1);
    for (key, value) in record {
        let column = WAREHOUSE_KEY_MAP
            .iter()
            .find(|(from, _)| *from == key.as_str())
            .map_or(key.as_str(), |(_, to)| *to);
        row.insert(column.to_string(), value.clone());
    }

    row.insert("timestamp".to_string(), Value::from(timestamp_ms));

    for column in STRINGIFIED_COLUMNS {
        if let Some(value) = row.get_mut(*column) {
            *value = Value::String(value.to_string());
        }
    }

    row
}

/// Warehouse backed by the local `tag_logs` table.
///
/// The destination table's project, dataset and table ids are stored as
/// columns so several tags can share one store.
#[derive(Clone)]
pub struct SqliteWarehouse {
    pool: DbPool,
}

impl SqliteWarehouse {
    /// Wraps a pool whose database has been migrated.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Warehouse for SqliteWarehouse {
    fn insert(
        &self,
        table: &WarehouseTable,
        rows: &[Map<String, Value>],
    ) -> Result<usize, ObserveError> {
        let conn = self.pool.get()?;
        let tx = conn.unchecked_transaction()?;

        let placeholders = (1..=ROW_COLUMNS.len() + 3)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO tag_logs (project_id, dataset_id, table_id, {}) VALUES ({placeholders})",
            ROW_COLUMNS.join(", ")
        );

        let mut written = 0;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                let mut params = vec![
                    SqlValue::Text(table.project_id.clone()),
                    SqlValue::Text(table.dataset_id.clone()),
                    SqlValue::Text(table.table_id.clone()),
                ];
                params.extend(
                    ROW_COLUMNS
                        .iter()
                        .map(|column| to_sql_value(row.get(*column))),
                );
                written += stmt.execute(rusqlite::params_from_iter(params))?;
            }
        }
        tx.commit()?;

        tracing::trace!(
            rows = written,
            project_id = %table.project_id,
            dataset_id = %table.dataset_id,
            table_id = %table.table_id,
            "wrote warehouse log rows"
        );

        Ok(written)
    }
}

fn to_sql_value(value: Option<&Value>) -> SqlValue {
    match value {
        None | Some(Value::Null) => SqlValue::Null,
        Some(Value::Bool(b)) => SqlValue::Integer(i64::from(*b)),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Some(Value::String(s)) => SqlValue::Text(s.clone()),
        Some(other) => SqlValue::Text(other.to_string()),
    }
}
