//! Per-invocation logging destinations.

use spectacle_types::{
    ContainerVersion, LogType, RequestHeaders, TagConfig, WarehouseLogType, WarehouseTable,
};

/// Header carrying the host's trace id.
const TRACE_ID_HEADER: &str = "trace-id";

/// Console policy: `always` logs, `debug` or an unset policy logs while the
/// container is in debug or preview mode, `preview` only in preview mode.
/// `no` and unrecognised policies never log.
pub fn console_enabled(log_type: Option<LogType>, container: ContainerVersion) -> bool {
    match log_type {
        Some(LogType::Always) => true,
        Some(LogType::Debug | LogType::Unset) | None => container.is_debug(),
        Some(LogType::Preview) => container.preview_mode,
        Some(LogType::No | LogType::Unknown) => false,
    }
}

/// Warehouse policy: only `always` enables it.
pub fn warehouse_enabled(log_type: Option<WarehouseLogType>) -> bool {
    match log_type {
        Some(WarehouseLogType::Always) => true,
        Some(WarehouseLogType::No | WarehouseLogType::Unknown) | None => false,
    }
}

/// Which destinations receive the records of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub console: bool,
    /// Destination table when warehouse logging is enabled.
    pub warehouse: Option<WarehouseTable>,
    /// Stamped onto every record as `TraceId`.
    pub trace_id: Option<String>,
}

impl LogSettings {
    /// Resolves destinations from the tag policies, container mode and
    /// request headers.
    pub fn resolve(
        tag: &TagConfig,
        container: ContainerVersion,
        headers: &RequestHeaders,
    ) -> Self {
        Self {
            console: console_enabled(tag.log_type, container),
            warehouse: warehouse_enabled(tag.warehouse_log_type).then(|| tag.warehouse_table()),
            trace_id: headers.get(TRACE_ID_HEADER).map(str::to_string),
        }
    }

    /// Settings with every destination off.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Returns `true` when at least one destination is on.
    pub fn is_enabled(&self) -> bool {
        self.console || self.warehouse.is_some()
    }
}
