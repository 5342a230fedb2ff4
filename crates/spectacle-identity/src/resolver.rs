//! Anonymous and known-user identity resolution.

use spectacle_types::EventData;

use crate::cookie::{CookieOptions, CookieStore};
use crate::random::RandomSource;
use crate::{ANON_COOKIE_KEY, USER_COOKIE_KEY};

/// Inclusive ranges of the five anonymous id segments. Each range fixes the
/// digit width of its segment (8-4-4-4-12).
const SEGMENT_RANGES: [(u64, u64); 5] = [
    (10_000_000, 99_999_999),
    (1_000, 9_999),
    (1_000, 9_999),
    (1_000, 9_999),
    (100_000_000_000, 999_999_999_999),
];

/// Generates a new anonymous id such as `48213377-1024-5531-9087-310249876512`.
pub fn generate_anonymous_id(random: &dyn RandomSource) -> String {
    SEGMENT_RANGES
        .iter()
        .map(|&(min, max)| random.generate(min, max).to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// Resolves and persists visitor identity for one invocation.
pub struct IdentityResolver<'a> {
    cookies: &'a mut dyn CookieStore,
    random: &'a dyn RandomSource,
    options: CookieOptions,
}

impl<'a> IdentityResolver<'a> {
    /// Creates a resolver writing identity cookies scoped to `cookie_domain`.
    pub fn new(
        cookies: &'a mut dyn CookieStore,
        random: &'a dyn RandomSource,
        cookie_domain: impl Into<String>,
    ) -> Self {
        Self {
            cookies,
            random,
            options: CookieOptions::identity(cookie_domain),
        }
    }

    /// Returns the visitor's anonymous id, generating one for first-time
    /// visitors. The cookie is re-written on every call so its expiry slides.
    pub fn resolve_anonymous_id(&mut self) -> String {
        let existing = first_non_empty(self.cookies.values(ANON_COOKIE_KEY));

        let anonymous_id = match existing {
            Some(id) => {
                tracing::debug!(anonymous_id = %id, "found existing anonymous id");
                id
            }
            None => {
                let id = generate_anonymous_id(self.random);
                tracing::debug!(anonymous_id = %id, "generated new anonymous id");
                id
            }
        };

        self.cookies
            .set(ANON_COOKIE_KEY, &anonymous_id, &self.options);
        anonymous_id
    }

    /// The user id persisted by an earlier identify call, if any.
    pub fn stored_user_id(&self) -> Option<String> {
        first_non_empty(self.cookies.values(USER_COOKIE_KEY))
    }

    /// The known user id: the stored cookie first, then event `user_id`.
    pub fn resolve_user_id(&self, event: &EventData) -> Option<String> {
        self.stored_user_id().or_else(|| event.string("user_id"))
    }

    /// Persists `user_id` for future invocations. Empty ids are ignored.
    pub fn store_user_id(&mut self, user_id: &str) {
        if user_id.is_empty() {
            return;
        }
        self.cookies.set(USER_COOKIE_KEY, user_id, &self.options);
    }
}

fn first_non_empty(values: Vec<String>) -> Option<String> {
    values.into_iter().next().filter(|v| !v.is_empty())
}
