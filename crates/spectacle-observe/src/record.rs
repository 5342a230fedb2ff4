//! The log record written for every outbound request and response.

use serde::Serialize;
use serde_json::{Map, Value};

/// Value of the `Name` field on every record.
pub const TAG_NAME: &str = "SpectacleServerTag";

/// `Message` of the record written when the request could not be sent.
pub const FAILURE_MESSAGE: &str = "Spectacle Request failed.";

/// Whether a record describes the outbound request or its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogKind {
    Request,
    Response,
}

/// A request or response log record. Unset fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogRecord {
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: LogKind,
    pub event_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl LogRecord {
    fn new(kind: LogKind, event_name: &str) -> Self {
        Self {
            name: TAG_NAME.to_string(),
            kind,
            event_name: event_name.to_string(),
            request_method: None,
            request_url: None,
            request_body: None,
            response_status_code: None,
            response_headers: None,
            response_body: None,
            message: None,
            reason: None,
            trace_id: None,
        }
    }

    /// Record for an outbound request about to be sent.
    pub fn request(event_name: &str, method: &str, url: &str, body: Value) -> Self {
        Self {
            request_method: Some(method.to_string()),
            request_url: Some(url.to_string()),
            request_body: Some(body),
            ..Self::new(LogKind::Request, event_name)
        }
    }

    /// Record for a response received from the collection endpoint.
    pub fn response(event_name: &str, status: u16, headers: Value, body: Value) -> Self {
        Self {
            response_status_code: Some(status),
            response_headers: Some(headers),
            response_body: Some(body),
            ..Self::new(LogKind::Response, event_name)
        }
    }

    /// Record for a request that never produced a response.
    pub fn failure(event_name: &str, reason: impl Into<String>) -> Self {
        Self {
            message: Some(FAILURE_MESSAGE.to_string()),
            reason: Some(reason.into()),
            ..Self::new(LogKind::Response, event_name)
        }
    }

    /// The record as a JSON object keyed by its PascalCase field names.
    pub fn to_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}
