//! Shared types for the Spectacle event forwarder.
//!
//! This crate holds the data model every other crate speaks: the inbound
//! tag configuration ([`TagConfig`]), the event data bag ([`EventData`]),
//! request headers, the outbound payload shapes, and the small host
//! capabilities (such as the [`Clock`]) that do not belong to a single
//! component.
//!
//! Nothing here performs I/O. Crates further up the stack inject the
//! cookie store, random source and HTTP transport.

mod event;
mod headers;
mod payload;
mod tag;

pub use event::{is_truthy, make_string, EventData};
pub use headers::RequestHeaders;
pub use payload::{
    Campaign, Context, PageContext, PageProperties, Payload, PayloadBody, Traits,
};
pub use tag::{KeyValue, LogType, TagConfig, WarehouseLogType, WarehouseTable};

use serde::{Deserialize, Serialize};

/// The four event shapes Spectacle accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodType {
    /// A page view.
    Page,
    /// A user identification, carrying traits.
    Identify,
    /// A named custom event.
    Track,
    /// Association of the visitor with a group/account.
    Group,
}

impl MethodType {
    /// Returns the wire name used for the payload `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Identify => "identify",
            Self::Track => "track",
            Self::Group => "group",
        }
    }

    /// Returns the collection endpoint path for this method.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Page => "/p",
            Self::Identify => "/i",
            Self::Track => "/t",
            Self::Group => "/g",
        }
    }
}

impl std::fmt::Display for MethodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MethodType {
    type Err = ParseMethodTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page" => Ok(Self::Page),
            "identify" => Ok(Self::Identify),
            "track" => Ok(Self::Track),
            "group" => Ok(Self::Group),
            _ => Err(ParseMethodTypeError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown method type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMethodTypeError(pub String);

impl std::fmt::Display for ParseMethodTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown method type: {}", self.0)
    }
}

impl std::error::Error for ParseMethodTypeError {}

/// Debug/preview state of the hosting container.
///
/// Console logging with the `debug` policy only fires while the container
/// is being previewed or debugged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerVersion {
    /// The container runs in debug mode.
    #[serde(default)]
    pub debug_mode: bool,
    /// The container runs in preview mode.
    #[serde(default)]
    pub preview_mode: bool,
}

impl ContainerVersion {
    /// Returns `true` when either debug or preview mode is active.
    pub fn is_debug(self) -> bool {
        self.debug_mode || self.preview_mode
    }
}

/// Source of wall-clock timestamps.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
