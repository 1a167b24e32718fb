//! Content fetching for discovered job postings.
//!
//! Given a [`Posting`], the fetcher either reuses inline text that arrived
//! with the search result or performs a rate-limit-aware HTTP GET with
//! browser-like headers, HTML-to-text cleaning, and a bounded retry loop.
//! Every failure is an expected degraded condition and returns `None`; the
//! orchestrator decides what an empty posting means for the run.

mod blocklist;
mod clean;
mod headers;

use std::time::Duration;

use rand::prelude::*;
use skillgap_shared::{MIN_CONTENT_LEN, Posting, Result, SkillgapError};
use tracing::{debug, instrument, warn};

pub use blocklist::is_blocked_domain;
pub use clean::html_to_text;

use headers::browser_headers;

/// Total attempts per URL (1 initial + 2 retries).
const MAX_ATTEMPTS: u32 = 3;

/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout (covers the slower read phase).
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Backoff base range in milliseconds; scaled by the attempt number.
const BACKOFF_RANGE_MS: (u64, u64) = (2000, 5000);

/// Maximum redirects to follow.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

/// One fetch attempt's failure, classified for the retry loop.
#[derive(Debug)]
enum FetchFailure {
    /// Retrying cannot help: 403/404, or content below the minimum length.
    Terminal(String),
    /// Transient transport or server trouble; worth another attempt.
    Retryable(String),
}

/// Classify a transport-level error. Connection failures, timeouts, and
/// generic request errors are all transient from the caller's perspective.
fn classify_transport(e: &reqwest::Error) -> FetchFailure {
    FetchFailure::Retryable(e.to_string())
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// HTTP content fetcher with anti-blocking heuristics.
pub struct Fetcher {
    client: reqwest::Client,
    backoff_range_ms: (u64, u64),
}

impl Fetcher {
    /// Create a fetcher with production timeouts and backoff.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| SkillgapError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            backoff_range_ms: BACKOFF_RANGE_MS,
        })
    }

    /// Override the backoff base range (tests use near-zero delays).
    pub fn with_backoff_range_ms(mut self, low: u64, high: u64) -> Self {
        self.backoff_range_ms = (low, high);
        self
    }

    /// Resolve the text for one posting: inline text if usable, otherwise a
    /// fetched-and-cleaned document. `None` means "no content source" in
    /// every failure mode.
    #[instrument(skip_all, fields(rank = posting.rank))]
    pub async fn fetch(&self, posting: &Posting) -> Option<String> {
        if posting.has_usable_inline_text() {
            debug!("using inline posting text, skipping fetch");
            return posting.inline_text.as_deref().map(|t| t.trim().to_string());
        }

        let url = posting.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        self.fetch_url(url).await
    }

    /// Fetch and clean one URL with the bounded retry policy.
    pub async fn fetch_url(&self, url: &str) -> Option<String> {
        if is_blocked_domain(url) {
            debug!(url, "skipping blocklisted domain");
            return None;
        }

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                let delay = self.backoff_delay(attempt);
                debug!(url, attempt, delay_ms = delay.as_millis() as u64, "backing off before retry");
                tokio::time::sleep(delay).await;
            }

            match self.attempt(url).await {
                Ok(text) => {
                    debug!(url, chars = text.len(), "fetched posting content");
                    return Some(text);
                }
                Err(FetchFailure::Terminal(reason)) => {
                    debug!(url, reason, "fetch failed terminally, not retrying");
                    return None;
                }
                Err(FetchFailure::Retryable(reason)) => {
                    warn!(url, attempt, reason, "fetch attempt failed");
                }
            }
        }

        warn!(url, attempts = MAX_ATTEMPTS, "fetch exhausted all attempts");
        None
    }

    /// One GET + clean attempt.
    async fn attempt(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        let response = self
            .client
            .get(url)
            .headers(browser_headers())
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchFailure::Terminal(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(FetchFailure::Retryable(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| classify_transport(&e))?;
        let text = html_to_text(&body);

        if text.trim().len() <= MIN_CONTENT_LEN {
            return Err(FetchFailure::Terminal(format!(
                "insufficient content ({} chars)",
                text.len()
            )));
        }

        Ok(text)
    }

    /// Randomized backoff, scaled by the attempt number.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let (low, high) = self.backoff_range_ms;
        let base = if high > low {
            rand::rng().random_range(low..high)
        } else {
            low
        };
        Duration::from_millis(base * attempt as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher() -> Fetcher {
        Fetcher::new().unwrap().with_backoff_range_ms(1, 2)
    }

    fn long_posting_html() -> String {
        format!(
            "<html><body><main><h1>Data Scientist</h1><p>{}</p></main></body></html>",
            "Python, SQL, and Docker experience required. ".repeat(20)
        )
    }

    #[tokio::test]
    async fn inline_text_short_circuits_network() {
        // No server at all: usable inline text must never hit the network.
        let posting = Posting {
            url: Some("http://127.0.0.1:1/unreachable".into()),
            inline_text: Some("x".repeat(MIN_CONTENT_LEN + 50)),
            rank: 0,
        };
        let text = test_fetcher().fetch(&posting).await;
        assert_eq!(text.unwrap().len(), MIN_CONTENT_LEN + 50);
    }

    #[tokio::test]
    async fn short_inline_text_is_not_reused() {
        let posting = Posting::from_text("too short to count", 0);
        // No URL either, so the fetch resolves to nothing.
        assert!(test_fetcher().fetch(&posting).await.is_none());
    }

    #[tokio::test]
    async fn retries_transient_errors_then_succeeds() {
        let server = MockServer::start().await;

        // Two transient failures, then a good response.
        Mock::given(method("GET"))
            .and(path("/job"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/job"))
            .respond_with(ResponseTemplate::new(200).set_body_string(long_posting_html()))
            .expect(1)
            .mount(&server)
            .await;

        let text = test_fetcher()
            .fetch_url(&format!("{}/job", server.uri()))
            .await
            .expect("third attempt succeeds");
        assert!(text.contains("Data Scientist"));
    }

    #[tokio::test]
    async fn forbidden_is_terminal_with_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/job"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let text = test_fetcher()
            .fetch_url(&format!("{}/job", server.uri()))
            .await;
        assert!(text.is_none());
        // expect(1) verifies on drop that no retry was issued.
    }

    #[tokio::test]
    async fn not_found_is_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        assert!(
            test_fetcher()
                .fetch_url(&format!("{}/gone", server.uri()))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn short_content_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>tiny</body></html>"),
            )
            .mount(&server)
            .await;

        assert!(
            test_fetcher()
                .fetch_url(&format!("{}/job", server.uri()))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn exhausts_attempts_on_persistent_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        assert!(
            test_fetcher()
                .fetch_url(&format!("{}/job", server.uri()))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn blocklisted_url_never_reaches_network() {
        // Would panic on connection anyway; the point is the early return.
        assert!(
            test_fetcher()
                .fetch_url("https://www.indeed.com/viewjob?jk=42")
                .await
                .is_none()
        );
    }
}
