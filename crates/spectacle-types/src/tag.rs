//! Tag configuration: the per-invocation settings supplied by the host.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::is_truthy;

/// Request timeout applied when the tag does not configure one.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Console logging policy.
///
/// Values the host does not recognise deserialize to `Unknown`, which never
/// logs, instead of rejecting the whole tag configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    /// An empty policy string; treated like an unset policy.
    #[serde(rename = "")]
    Unset,
    /// Log only while the container is in debug or preview mode.
    Debug,
    /// Log only while the container is in preview mode.
    Preview,
    /// Always log.
    Always,
    /// Never log.
    No,
    #[serde(other)]
    Unknown,
}

/// Warehouse logging policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseLogType {
    /// Insert every log record into the warehouse table.
    Always,
    /// Never write to the warehouse.
    No,
    /// Anything else; never writes.
    #[serde(other)]
    Unknown,
}

/// Destination table for warehouse log rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarehouseTable {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

/// A configured key/value pair (custom trait or event property).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the pair when both the key and the value are usable.
    pub fn entry(&self) -> Option<(&str, &Value)> {
        if self.key.is_empty() || !is_truthy(&self.value) {
            return None;
        }
        Some((self.key.as_str(), &self.value))
    }
}

/// Everything the host passes along with a single invocation.
///
/// Field names follow the tag template's camelCase parameter names so a tag
/// configuration can be forwarded as JSON unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagConfig {
    /// `page`, `identify`, `track` or `group`. Kept as a raw string so an
    /// unknown method surfaces as an invocation failure rather than a
    /// deserialization error.
    pub method_type: String,
    /// Tenant identifier sent as the payload `writeKey`.
    pub workspace_id: String,
    /// Collection endpoint base URL, e.g. `https://collect.example.com`.
    pub base_url: String,
    pub cookie_domain: Option<String>,
    /// `required` gates the invocation on ad-storage consent.
    pub ad_storage_consent: Option<String>,
    pub log_type: Option<LogType>,
    #[serde(rename = "bigQueryLogType")]
    pub warehouse_log_type: Option<WarehouseLogType>,
    #[serde(rename = "logBigQueryProjectId")]
    pub warehouse_project_id: Option<String>,
    #[serde(rename = "logBigQueryDatasetId")]
    pub warehouse_dataset_id: Option<String>,
    #[serde(rename = "logBigQueryTableId")]
    pub warehouse_table_id: Option<String>,

    // identify
    pub user_id: Option<Value>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_traits: Vec<KeyValue>,
    #[serde(rename = "doNotSaveUserEmailAsUserIdCookie")]
    pub skip_email_user_id_cookie: bool,

    // track
    pub event_name: Option<String>,
    pub event_properties: Vec<KeyValue>,
    pub revenue: Option<Value>,
    pub currency: Option<String>,

    // group
    pub group_id: Option<Value>,
    pub group_traits: Vec<KeyValue>,

    /// Report success as soon as the request is issued.
    #[serde(rename = "optimisticScenario")]
    pub optimistic: bool,
    pub request_timeout_ms: Option<u64>,
}

impl TagConfig {
    /// Returns `true` when the invocation must be gated on ad-storage consent.
    pub fn requires_ad_storage_consent(&self) -> bool {
        self.ad_storage_consent.as_deref() == Some("required")
    }

    /// Warehouse table configured for log rows.
    pub fn warehouse_table(&self) -> WarehouseTable {
        WarehouseTable {
            project_id: self.warehouse_project_id.clone().unwrap_or_default(),
            dataset_id: self.warehouse_dataset_id.clone().unwrap_or_default(),
            table_id: self.warehouse_table_id.clone().unwrap_or_default(),
        }
    }

    /// Client-side timeout for the outbound request. Zero means unset.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(
            self.request_timeout_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        )
    }
}
