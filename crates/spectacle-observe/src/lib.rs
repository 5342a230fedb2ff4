//! Request/response logging for the Spectacle forwarder.
//!
//! Every outbound request and its response (or failure) produce a
//! [`LogRecord`]. The [`Logger`] fans each record out to zero, one or two
//! destinations, decided per invocation by [`LogSettings`]:
//!
//! | Destination | Policy (`logType` / `bigQueryLogType`) |
//! |-------------|----------------------------------------|
//! | console | `always`; `debug` or unset while the container is in debug/preview; never for `no` |
//! | warehouse | `always` only |
//!
//! The console sink writes the record as a single JSON line through
//! `tracing`. The warehouse sink renames keys to snake_case columns,
//! stringifies nested objects and inserts the row into the log store.
//!
//! Logging never affects the invocation outcome: sink failures are
//! reported with `tracing::warn!` and dropped.

mod error;
mod logger;
mod policy;
mod record;
mod sink;
mod warehouse;

pub use error::ObserveError;
pub use logger::Logger;
pub use policy::{console_enabled, warehouse_enabled, LogSettings};
pub use record::{LogKind, LogRecord, FAILURE_MESSAGE, TAG_NAME};
pub use sink::{ConsoleSink, LogSink, Warehouse};
pub use warehouse::{warehouse_row, SqliteWarehouse, WAREHOUSE_KEY_MAP};
