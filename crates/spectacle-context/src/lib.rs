//! Per-invocation context for Spectacle payloads.
//!
//! Builds the `context` object attached to every payload (page, campaign,
//! user agent, timezone, locale) from event data and request headers, plus
//! the page-call properties and the cookie domain used for identity
//! cookies. Nothing here is persisted; a context is derived fresh for every
//! invocation.

mod campaign;
mod domain;
mod page;

pub use campaign::extract_campaign;
pub use domain::resolve_cookie_domain;
pub use page::{page_context, page_properties, parse_screen_resolution, UrlParts};

use spectacle_types::{Context, EventData, RequestHeaders};

/// Event keys consulted for the timezone, in order.
const TIMEZONE_KEYS: &[&str] = &["ga_session_data.timezone", "timezone"];

/// Event keys consulted for the locale, in order.
const LOCALE_KEYS: &[&str] = &["language", "user_properties.language"];

const DEFAULT_TIMEZONE: &str = "UTC";

/// Builds the payload context for one invocation.
pub fn build_context(event: &EventData, headers: &RequestHeaders) -> Context {
    let page = page_context(event);
    let campaign = extract_campaign(&page.url);

    Context {
        timezone: resolve_timezone(event),
        campaign,
        user_agent: resolve_user_agent(event, headers),
        page,
        locale: resolve_locale(event),
    }
}

/// Event `user_agent`, then the `user-agent` header, else empty.
pub fn resolve_user_agent(event: &EventData, headers: &RequestHeaders) -> String {
    event
        .string("user_agent")
        .or_else(|| headers.get("user-agent").map(str::to_string))
        .unwrap_or_default()
}

pub fn resolve_timezone(event: &EventData) -> String {
    event
        .first_string(TIMEZONE_KEYS)
        .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string())
}

pub fn resolve_locale(event: &EventData) -> Option<String> {
    event.first_string(LOCALE_KEYS)
}

/// The URL the event was recorded on: event `page_location`, falling back
/// to the `referer` header.
pub fn resolve_page_url(event: &EventData, headers: &RequestHeaders) -> Option<String> {
    event
        .string("page_location")
        .or_else(|| headers.get("referer").map(str::to_string))
}
