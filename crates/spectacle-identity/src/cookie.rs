//! Cookie storage capability and the identity cookie policy.

use std::collections::HashMap;
use std::fmt;

use crate::COOKIE_MAX_AGE_SECS;

/// Domain value meaning "let the host decide" (a host-only cookie).
pub const AUTO_DOMAIN: &str = "auto";

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
            Self::None => "None",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes written alongside a cookie value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    /// Cookie domain, or [`AUTO_DOMAIN`].
    pub domain: String,
    pub path: String,
    pub max_age_secs: u64,
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieOptions {
    /// The policy shared by both identity cookies: path `/`, one year,
    /// secure, `SameSite=Lax`.
    pub fn identity(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            path: "/".to_string(),
            max_age_secs: COOKIE_MAX_AGE_SECS,
            secure: true,
            same_site: SameSite::Lax,
        }
    }

    /// The `Domain` attribute to emit, or `None` for a host-only cookie.
    pub fn domain_attribute(&self) -> Option<&str> {
        match self.domain.as_str() {
            "" | AUTO_DOMAIN => None,
            domain => Some(domain),
        }
    }
}

/// Host-provided cookie storage.
///
/// Reads see the cookies the visitor sent with the current request; writes
/// are delivered back to the visitor by the host.
pub trait CookieStore: Send {
    /// All values sent for `name`, in header order.
    fn values(&self, name: &str) -> Vec<String>;

    /// Writes (or refreshes) a cookie.
    fn set(&mut self, name: &str, value: &str, options: &CookieOptions);
}

/// In-process [`CookieStore`] that keeps the latest write per name.
///
/// Writes are visible to subsequent reads, so one store can stand in for a
/// visitor's browser across several invocations.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieStore {
    cookies: HashMap<String, (String, CookieOptions)>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a cookie as if the visitor had sent it.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(
            name.to_string(),
            (value.to_string(), CookieOptions::identity(AUTO_DOMAIN)),
        );
        self
    }

    /// Options of the most recent write for `name`.
    pub fn options(&self, name: &str) -> Option<&CookieOptions> {
        self.cookies.get(name).map(|(_, options)| options)
    }

    /// Current value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|(value, _)| value.as_str())
    }
}

impl CookieStore for MemoryCookieStore {
    fn values(&self, name: &str) -> Vec<String> {
        self.get(name).map(str::to_string).into_iter().collect()
    }

    fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        self.cookies
            .insert(name.to_string(), (value.to_string(), options.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_policy_matches_cookie_contract() {
        let options = CookieOptions::identity(".example.com");
        assert_eq!(options.path, "/");
        assert_eq!(options.max_age_secs, 31_536_000);
        assert!(options.secure);
        assert_eq!(options.same_site, SameSite::Lax);
        assert_eq!(options.domain_attribute(), Some(".example.com"));
    }

    #[test]
    fn auto_domain_is_host_only() {
        assert_eq!(CookieOptions::identity(AUTO_DOMAIN).domain_attribute(), None);
        assert_eq!(CookieOptions::identity("").domain_attribute(), None);
    }

    #[test]
    fn memory_store_reads_back_writes() {
        let mut store = MemoryCookieStore::new();
        assert!(store.values("a").is_empty());

        store.set("a", "1", &CookieOptions::identity(AUTO_DOMAIN));
        store.set("a", "2", &CookieOptions::identity(".example.com"));

        assert_eq!(store.values("a"), vec!["2".to_string()]);
        assert_eq!(
            store.options("a").and_then(CookieOptions::domain_attribute),
            Some(".example.com")
        );
    }
}
