//! Cookie store backed by the inbound `Cookie` header.
//!
//! Reads see only what the visitor sent. Writes are collected and rendered
//! as `Set-Cookie` headers on the response; a second write to the same name
//! replaces the first.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, SameSite as CookieSameSite};
use spectacle_identity::{CookieOptions, CookieStore, SameSite};

/// The visitor's cookies for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestCookies {
    received: Vec<(String, String)>,
    written: Vec<(String, String, CookieOptions)>,
}

impl RequestCookies {
    /// Parses every `Cookie` header in `headers`, in order. Values are
    /// percent-decoded and stripped of surrounding quotes; malformed pairs
    /// are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let received = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse_encoded)
            .filter_map(Result::ok)
            .map(|cookie| (cookie.name().to_string(), cookie.value_trimmed().to_string()))
            .collect();

        Self {
            received,
            written: Vec::new(),
        }
    }

    /// `Set-Cookie` header values for every write, in write order.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.written
            .iter()
            .map(|(name, value, options)| build_cookie(name, value, options).encoded().to_string())
            .collect()
    }
}

impl CookieStore for RequestCookies {
    fn values(&self, name: &str) -> Vec<String> {
        self.received
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        self.written.retain(|(n, _, _)| n != name);
        self.written
            .push((name.to_string(), value.to_string(), options.clone()));
    }
}

fn build_cookie(name: &str, value: &str, options: &CookieOptions) -> Cookie<'static> {
    let max_age = i64::try_from(options.max_age_secs).unwrap_or(i64::MAX);
    let mut builder = Cookie::build((name.to_string(), value.to_string()))
        .path(options.path.clone())
        .max_age(time::Duration::seconds(max_age))
        .secure(options.secure)
        .same_site(match options.same_site {
            SameSite::Lax => CookieSameSite::Lax,
            SameSite::Strict => CookieSameSite::Strict,
            SameSite::None => CookieSameSite::None,
        });
    if let Some(domain) = options.domain_attribute() {
        builder = builder.domain(domain.to_string());
    }
    builder.build()
}
