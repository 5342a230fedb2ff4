//! Outbound payload shapes sent to the collection endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::MethodType;

/// Free-form trait or property bag.
pub type Traits = Map<String, Value>;

/// UTM campaign attribution. Absent parameters are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Campaign {
    /// Returns `true` when no UTM parameter was found.
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.medium.is_none()
            && self.name.is_none()
            && self.term.is_none()
            && self.content.is_none()
    }
}

/// The page the event was recorded on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub path: String,
    pub referrer: String,
    pub search: String,
    pub title: String,
    pub url: String,
}

/// Per-invocation context attached to every payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub timezone: String,
    pub campaign: Campaign,
    pub user_agent: String,
    pub page: PageContext,
    pub locale: Option<String>,
}

/// Properties of a `page` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageProperties {
    pub title: String,
    pub url: String,
    pub path: String,
    pub hash: String,
    pub search: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Method-specific part of a payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PayloadBody {
    Page {
        properties: PageProperties,
    },
    Identify {
        traits: Traits,
    },
    Track {
        event: String,
        properties: Traits,
    },
    Group {
        #[serde(rename = "groupId")]
        group_id: String,
        traits: Traits,
    },
}

impl PayloadBody {
    /// The method this body belongs to.
    pub fn method(&self) -> MethodType {
        match self {
            Self::Page { .. } => MethodType::Page,
            Self::Identify { .. } => MethodType::Identify,
            Self::Track { .. } => MethodType::Track,
            Self::Group { .. } => MethodType::Group,
        }
    }
}

/// A fully assembled payload, ready to be serialized and sent once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(rename = "type")]
    pub method: MethodType,
    pub context: Context,
    pub user_id: Option<String>,
    pub anonymous_id: String,
    pub write_key: String,
    #[serde(flatten)]
    pub body: PayloadBody,
}
