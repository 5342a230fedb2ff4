//! The event data bag delivered with every invocation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key/value event data as delivered by the tag-manager client.
///
/// Keys follow the GA4 event model (`page_location`, `user_data.email_address`,
/// `x-ga-gcs`, ...). Lookups accept dotted paths into nested objects; a key
/// that literally contains dots is matched first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventData(Map<String, Value>);

impl EventData {
    /// Wraps an already-parsed JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Returns the value at `key`, walking dotted paths through nested
    /// objects and arrays.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(key) {
            return Some(value);
        }

        let mut parts = key.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Returns the value at `key` rendered as a string, or `None` when the
    /// value is missing or falsy (`null`, `false`, `0`, `""`).
    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| is_truthy(v)).map(make_string)
    }

    /// Returns the first truthy value among `keys`, rendered as a string.
    pub fn first_string(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.string(key))
    }

    /// Sets a top-level field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Borrows the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for EventData {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// JavaScript-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Renders a JSON value as a plain string.
///
/// Strings are returned unquoted; everything else uses its JSON text.
pub fn make_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> EventData {
        serde_json::from_value(value).expect("event data should deserialize")
    }

    #[test]
    fn dotted_paths_walk_nested_objects() {
        let data = event(json!({
            "user_data": { "email_address": "a@example.com" },
            "items": [{ "id": "sku-1" }]
        }));

        assert_eq!(
            data.string("user_data.email_address").as_deref(),
            Some("a@example.com")
        );
        assert_eq!(data.string("items.0.id").as_deref(), Some("sku-1"));
        assert_eq!(data.get("user_data.missing"), None);
        assert_eq!(data.get("items.x"), None);
    }

    #[test]
    fn literal_keys_win_over_paths() {
        let data = event(json!({
            "x-ga-gcs": "G111",
            "a.b": "literal",
            "a": { "b": "nested" }
        }));

        assert_eq!(data.string("x-ga-gcs").as_deref(), Some("G111"));
        assert_eq!(data.string("a.b").as_deref(), Some("literal"));
    }

    #[test]
    fn falsy_values_are_skipped() {
        let data = event(json!({
            "empty": "",
            "zero": 0,
            "off": false,
            "nothing": null,
            "count": 3,
            "timezone": "Europe/Berlin"
        }));

        assert_eq!(data.string("empty"), None);
        assert_eq!(data.string("zero"), None);
        assert_eq!(data.string("off"), None);
        assert_eq!(data.string("nothing"), None);
        assert_eq!(data.string("count").as_deref(), Some("3"));
        assert_eq!(
            data.first_string(&["empty", "timezone"]).as_deref(),
            Some("Europe/Berlin")
        );
    }

    #[test]
    fn make_string_renders_non_strings() {
        assert_eq!(make_string(&json!("abc")), "abc");
        assert_eq!(make_string(&json!(42)), "42");
        assert_eq!(make_string(&json!(12.5)), "12.5");
        assert_eq!(make_string(&json!(true)), "true");
    }
}
