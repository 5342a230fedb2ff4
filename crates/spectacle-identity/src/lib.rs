//! Visitor identity for the Spectacle forwarder.
//!
//! Every visitor carries a durable anonymous identifier in the
//! `sp__anon_id` cookie. Identify calls may additionally persist a known
//! user identifier in `sp__user_id`, which then takes precedence over any
//! user id found in later event data.
//!
//! Cookie storage and randomness are host capabilities and are injected
//! through the [`CookieStore`] and [`RandomSource`] traits.

mod cookie;
mod random;
mod resolver;

pub use cookie::{CookieOptions, CookieStore, MemoryCookieStore, SameSite, AUTO_DOMAIN};
pub use random::{RandomSource, ThreadRandom};
pub use resolver::{generate_anonymous_id, IdentityResolver};

/// Cookie holding the anonymous visitor identifier.
pub const ANON_COOKIE_KEY: &str = "sp__anon_id";

/// Cookie holding the identified user id.
pub const USER_COOKIE_KEY: &str = "sp__user_id";

/// Identity cookies live for a year.
pub const COOKIE_EXPIRY_DAYS: u64 = 365;

/// [`COOKIE_EXPIRY_DAYS`] in seconds, as sent in `Max-Age`.
pub const COOKIE_MAX_AGE_SECS: u64 = COOKIE_EXPIRY_DAYS * 24 * 60 * 60;
