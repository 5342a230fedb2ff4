//! Cookie domain resolution.

use url::{Host, Url};

const AUTO: &str = "auto";

/// Resolves the domain for identity cookies.
///
/// An explicitly configured domain is used as-is with a leading `.` added
/// when missing. Otherwise the registrable domain of `page_url` is used
/// (`https://shop.example.com/` → `.example.com`), looked up against the
/// Public Suffix List so hosted suffixes such as `github.io` are never used
/// as a cookie domain. Hosts without a registrable domain (IP addresses,
/// `localhost`, bare suffixes, unparseable URLs) yield `"auto"`, which
/// leaves the choice to the host.
pub fn resolve_cookie_domain(configured: Option<&str>, page_url: Option<&str>) -> String {
    if let Some(domain) = configured.map(str::trim).filter(|d| !d.is_empty()) {
        let domain = if domain.starts_with('.') {
            domain.to_string()
        } else {
            format!(".{domain}")
        };
        tracing::debug!(cookie_domain = %domain, "using configured cookie domain");
        return domain;
    }

    page_url
        .and_then(registrable_domain)
        .map(|domain| format!(".{domain}"))
        .unwrap_or_else(|| AUTO.to_string())
}

fn registrable_domain(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let Host::Domain(host) = url.host()? else {
        return None;
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if !host.contains('.') {
        return None;
    }
    psl::domain_str(&host).map(str::to_string)
}
