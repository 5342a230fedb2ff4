//! Invocation gates evaluated before any identity work.

use serde_json::Value;
use spectacle_types::{is_truthy, EventData, TagConfig};

/// Page URLs of the host's own measurement probe requests.
pub const MEASUREMENT_PROBE_PREFIX: &str = "https://gtm-msr.appspot.com/";

/// Returns `true` when ad-storage consent is not required by the tag or has
/// been granted for this event.
///
/// A present `consent_state` object decides through its `ad_storage` flag.
/// Otherwise the packed `x-ga-gcs` string (e.g. `G111`) must carry `1` at
/// index 2.
pub fn consent_granted(tag: &TagConfig, event: &EventData) -> bool {
    if !tag.requires_ad_storage_consent() {
        return true;
    }

    let fields = event.as_map();
    if let Some(state) = fields.get("consent_state").filter(|v| is_truthy(v)) {
        return state.get("ad_storage").is_some_and(is_truthy);
    }

    fields
        .get("x-ga-gcs")
        .and_then(Value::as_str)
        .and_then(|gcs| gcs.chars().nth(2))
        == Some('1')
}

/// Returns `true` for requests issued by the measurement probe, which are
/// acknowledged without doing anything.
pub fn is_measurement_probe(page_url: Option<&str>) -> bool {
    page_url.is_some_and(|url| url.starts_with(MEASUREMENT_PROBE_PREFIX))
}
