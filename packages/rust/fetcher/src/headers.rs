//! Browser-like request headers for posting fetches.
//!
//! Job boards aggressively fingerprint clients, so every attempt sends a
//! rotating desktop User-Agent plus the header set a real browser would.

use rand::prelude::*;
use reqwest::header::{HeaderMap, HeaderValue};

/// Desktop User-Agent pool, rotated per attempt.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
];

/// Build the header set for one fetch attempt, with a randomized User-Agent.
pub(crate) fn browser_headers() -> HeaderMap {
    let ua = USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0]);

    let mut headers = HeaderMap::new();
    headers.insert("User-Agent", HeaderValue::from_static(ua));
    headers.insert(
        "Accept",
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("none"));
    headers.insert("Cache-Control", HeaderValue::from_static("max-age=0"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_a_known_user_agent() {
        let headers = browser_headers();
        let ua = headers
            .get("User-Agent")
            .and_then(|v| v.to_str().ok())
            .expect("User-Agent present");
        assert!(USER_AGENTS.contains(&ua));
        assert!(headers.contains_key("Accept-Language"));
    }
}
