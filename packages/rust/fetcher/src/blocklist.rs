//! Domains known to serve anti-bot responses to scrapers.
//!
//! Requests to these hosts always come back 403 or as CAPTCHA shells, so
//! they are skipped outright instead of burning retry attempts.

use url::Url;

/// Domains (including subdomains) that reject automated fetches.
const BLOCKED_DOMAINS: &[&str] = &["bls.gov", "indeed.com", "glassdoor.com", "linkedin.com"];

/// Whether the URL's host falls under a blocklisted domain.
///
/// Unparseable URLs are not considered blocked — the fetch attempt itself
/// will fail and be handled by the normal failure path.
pub fn is_blocked_domain(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();

    BLOCKED_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}
