//! Payload assembly for the four method variants.
//!
//! The base fields (anonymous id, user id, context, write key) are resolved
//! before any method-specific validation, so the anonymous id cookie is
//! refreshed even for calls that end up failing.

use serde_json::Value;
use spectacle_context::page_properties;
use spectacle_identity::IdentityResolver;
use spectacle_types::{
    is_truthy, make_string, Context, EventData, KeyValue, MethodType, Payload, PayloadBody,
    TagConfig, Traits,
};

use crate::error::ForwardError;

/// Builds the payload for `method`.
///
/// Fails with [`ForwardError::MissingEventName`] or
/// [`ForwardError::MissingGroupId`] when a required field cannot be
/// resolved.
pub fn assemble(
    method: MethodType,
    tag: &TagConfig,
    event: &EventData,
    context: Context,
    identity: &mut IdentityResolver<'_>,
) -> Result<Payload, ForwardError> {
    let anonymous_id = identity.resolve_anonymous_id();
    let mut user_id = identity.resolve_user_id(event);

    let body = match method {
        MethodType::Page => PayloadBody::Page {
            properties: page_properties(event),
        },
        MethodType::Identify => {
            if let Some(id) = identify_user_id(tag, event) {
                let is_email = identify_email(tag, event).is_some_and(|email| make_string(&email) == id);
                if tag.skip_email_user_id_cookie && is_email {
                    tracing::debug!("user id equals email, not persisting it");
                } else {
                    identity.store_user_id(&id);
                }
                user_id = Some(id);
            }
            PayloadBody::Identify {
                traits: identify_traits(tag, event),
            }
        }
        MethodType::Track => PayloadBody::Track {
            event: track_event_name(tag, event).ok_or(ForwardError::MissingEventName)?,
            properties: track_properties(tag),
        },
        MethodType::Group => PayloadBody::Group {
            group_id: group_id(tag, event).ok_or(ForwardError::MissingGroupId)?,
            traits: custom_pairs(&tag.group_traits),
        },
    };

    Ok(Payload {
        method,
        context,
        user_id,
        anonymous_id,
        write_key: tag.workspace_id.clone(),
        body,
    })
}

/// Tag `userId`, then event `user_id`, then `user_data.email_address`.
fn identify_user_id(tag: &TagConfig, event: &EventData) -> Option<String> {
    configured_string(tag.user_id.as_ref())
        .or_else(|| event.first_string(&["user_id", "user_data.email_address"]))
}

fn identify_email(tag: &TagConfig, event: &EventData) -> Option<Value> {
    trait_value(
        tag.email.as_deref(),
        event,
        &["user_data.email_address", "user_properties.email"],
    )
}

fn identify_traits(tag: &TagConfig, event: &EventData) -> Traits {
    let mut traits = Traits::new();

    let standard = [
        ("email", identify_email(tag, event)),
        (
            "firstName",
            trait_value(
                tag.first_name.as_deref(),
                event,
                &["user_data.first_name", "user_properties.first_name"],
            ),
        ),
        (
            "lastName",
            trait_value(
                tag.last_name.as_deref(),
                event,
                &["user_data.last_name", "user_properties.last_name"],
            ),
        ),
        (
            "phone",
            trait_value(
                None,
                event,
                &["user_data.phone_number", "user_properties.phone"],
            ),
        ),
    ];
    for (key, value) in standard {
        if let Some(value) = value {
            traits.insert(key.to_string(), value);
        }
    }

    traits.extend(custom_pairs(&tag.user_traits));
    traits
}

/// Tag `eventName`, then event `event_name`.
fn track_event_name(tag: &TagConfig, event: &EventData) -> Option<String> {
    tag.event_name
        .clone()
        .filter(|name| !name.is_empty())
        .or_else(|| event.string("event_name"))
}

fn track_properties(tag: &TagConfig) -> Traits {
    let mut properties = Traits::new();
    if let Some(revenue) = tag.revenue.as_ref().filter(|v| is_truthy(v)) {
        properties.insert("revenue".to_string(), revenue.clone());
    }
    if let Some(currency) = tag.currency.as_ref().filter(|c| !c.is_empty()) {
        properties.insert("currency".to_string(), Value::String(currency.clone()));
    }
    properties.extend(custom_pairs(&tag.event_properties));
    properties
}

/// Tag `groupId`, then event `group_id`.
fn group_id(tag: &TagConfig, event: &EventData) -> Option<String> {
    configured_string(tag.group_id.as_ref()).or_else(|| event.string("group_id"))
}

fn configured_string(value: Option<&Value>) -> Option<String> {
    value.filter(|v| is_truthy(v)).map(make_string)
}

/// A configured string if non-empty, else the first truthy event value.
fn trait_value(configured: Option<&str>, event: &EventData, keys: &[&str]) -> Option<Value> {
    if let Some(value) = configured.filter(|v| !v.is_empty()) {
        return Some(Value::String(value.to_string()));
    }
    keys.iter()
        .filter_map(|key| event.get(key))
        .find(|v| is_truthy(v))
        .cloned()
}

/// Configured pairs with a non-empty key and a truthy value, in order.
/// Later duplicates overwrite earlier ones.
fn custom_pairs(pairs: &[KeyValue]) -> Traits {
    pairs
        .iter()
        .filter_map(KeyValue::entry)
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}
