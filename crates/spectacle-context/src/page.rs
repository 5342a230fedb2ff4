//! Page context, page-call properties, and screen resolution parsing.

use spectacle_types::{EventData, PageContext, PageProperties};
use url::Url;

/// Browser-style components of a page URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    /// `pathname`, e.g. `/pricing`.
    pub path: String,
    /// `search` including the leading `?`, or empty.
    pub search: String,
    /// `hash` including the leading `#`, or empty.
    pub hash: String,
}

impl UrlParts {
    /// Splits `raw` into its components. Returns `None` when `raw` is not an
    /// absolute URL.
    pub fn parse(raw: &str) -> Option<Self> {
        let url = Url::parse(raw).ok()?;
        Some(Self {
            path: url.path().to_string(),
            search: prefixed('?', url.query()),
            hash: prefixed('#', url.fragment()),
        })
    }
}

fn prefixed(prefix: char, component: Option<&str>) -> String {
    match component {
        Some(value) if !value.is_empty() => format!("{prefix}{value}"),
        _ => String::new(),
    }
}

/// Builds `context.page` from event `page_location`, `page_referrer` and
/// `page_title`.
pub fn page_context(event: &EventData) -> PageContext {
    let url = event.string("page_location").unwrap_or_default();
    let parts = UrlParts::parse(&url).unwrap_or_default();

    PageContext {
        path: parts.path,
        referrer: event.string("page_referrer").unwrap_or_default(),
        search: parts.search,
        title: event.string("page_title").unwrap_or_default(),
        url,
    }
}

/// Builds the `properties` of a page call.
pub fn page_properties(event: &EventData) -> PageProperties {
    let url = event.string("page_location").unwrap_or_default();
    let parts = UrlParts::parse(&url).unwrap_or_default();
    let (width, height) = event
        .string("screen_resolution")
        .map(|resolution| parse_screen_resolution(&resolution))
        .unwrap_or((None, None));

    PageProperties {
        title: event.string("page_title").unwrap_or_default(),
        url,
        path: parts.path,
        hash: parts.hash,
        search: parts.search,
        width,
        height,
    }
}

/// Parses a `"WxH"` screen resolution. Both dimensions are `None` unless
/// the string holds two integers separated by `x`.
pub fn parse_screen_resolution(resolution: &str) -> (Option<i64>, Option<i64>) {
    let mut dimensions = resolution.split('x');
    let (Some(width), Some(height)) = (dimensions.next(), dimensions.next()) else {
        return (None, None);
    };

    match (width.trim().parse(), height.trim().parse()) {
        (Ok(width), Ok(height)) => (Some(width), Some(height)),
        _ => {
            tracing::debug!(resolution, "ignoring malformed screen resolution");
            (None, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_parts_match_browser_components() {
        let parts = UrlParts::parse("https://example.com/docs/intro?lang=en#setup")
            .expect("url should parse");
        assert_eq!(parts.path, "/docs/intro");
        assert_eq!(parts.search, "?lang=en");
        assert_eq!(parts.hash, "#setup");

        let bare = UrlParts::parse("https://example.com").expect("url should parse");
        assert_eq!(bare.path, "/");
        assert_eq!(bare.search, "");
        assert_eq!(bare.hash, "");

        let empty_query = UrlParts::parse("https://example.com/a?#").expect("url should parse");
        assert_eq!(empty_query.search, "");
        assert_eq!(empty_query.hash, "");
    }

    #[test]
    fn relative_or_empty_urls_do_not_parse() {
        assert_eq!(UrlParts::parse(""), None);
        assert_eq!(UrlParts::parse("/relative/path"), None);
    }

    #[test]
    fn screen_resolution_parses_dimensions() {
        assert_eq!(parse_screen_resolution("1920x1080"), (Some(1920), Some(1080)));
        assert_eq!(parse_screen_resolution("390x844"), (Some(390), Some(844)));
    }

    #[test]
    fn malformed_screen_resolution_yields_nothing() {
        assert_eq!(parse_screen_resolution(""), (None, None));
        assert_eq!(parse_screen_resolution("1920"), (None, None));
        assert_eq!(parse_screen_resolution("1920x"), (None, None));
        assert_eq!(parse_screen_resolution("widexhigh"), (None, None));
        assert_eq!(parse_screen_resolution("1920*1080"), (None, None));
    }

    #[test]
    fn page_properties_from_event() {
        let event: EventData = serde_json::from_value(json!({
            "page_location": "https://example.com/blog/post?ref=rss#comments",
            "page_title": "A Post",
            "screen_resolution": "1440x900"
        }))
        .expect("event data should deserialize");

        let properties = page_properties(&event);
        assert_eq!(properties.title, "A Post");
        assert_eq!(properties.url, "https://example.com/blog/post?ref=rss#comments");
        assert_eq!(properties.path, "/blog/post");
        assert_eq!(properties.search, "?ref=rss");
        assert_eq!(properties.hash, "#comments");
        assert_eq!(properties.width, Some(1440));
        assert_eq!(properties.height, Some(900));
    }

    #[test]
    fn page_properties_without_location() {
        let properties = page_properties(&EventData::default());
        assert_eq!(properties, PageProperties::default());
    }
}
