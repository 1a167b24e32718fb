//! Job-posting discovery via the Tavily search API.
//!
//! The provider's response shape is not contractually fixed, so everything
//! that comes back is funneled through [`normalize`] before the rest of the
//! pipeline sees it. Search unavailability is an expected degraded
//! condition: every failure path returns an empty posting list and the
//! pipeline continues with "no evidence".

mod normalize;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use skillgap_shared::{Posting, Result, SkillgapError};
use tracing::{debug, instrument, warn};

pub use normalize::{ResponseShape, classify, normalize};

/// Default timeout in seconds for search requests.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Job boards the search is steered toward.
const INCLUDE_DOMAINS: &[&str] = &[
    "indeed.com",
    "linkedin.com",
    "glassdoor.com",
    "monster.com",
    "ziprecruiter.com",
];

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("skillgap/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// JobSearch trait
// ---------------------------------------------------------------------------

/// Capability: discover job postings for a free-text role.
///
/// Implementations must not fail — search unavailability degrades to an
/// empty list.
#[async_trait]
pub trait JobSearch: Send + Sync {
    async fn search(&self, role: &str, limit: usize) -> Vec<Posting>;
}

// ---------------------------------------------------------------------------
// Tavily client
// ---------------------------------------------------------------------------

/// Tavily search client.
pub struct TavilySearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: String,
    search_depth: &'static str,
    include_domains: &'static [&'static str],
    max_results: usize,
}

impl TavilySearch {
    /// Build a Tavily client for the given endpoint and API key.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| SkillgapError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Issue the search request and return the raw JSON body.
    async fn search_raw(&self, role: &str, limit: usize) -> Result<Value> {
        let request = SearchRequest {
            api_key: &self.api_key,
            query: format!("{role} job requirements skills responsibilities"),
            search_depth: "advanced",
            include_domains: INCLUDE_DOMAINS,
            max_results: limit,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SkillgapError::Network(format!("search request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkillgapError::Network(format!(
                "search returned HTTP {status}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SkillgapError::parse(format!("search response body: {e}")))
    }
}

#[async_trait]
impl JobSearch for TavilySearch {
    #[instrument(skip(self), fields(role = %role, limit))]
    async fn search(&self, role: &str, limit: usize) -> Vec<Posting> {
        let raw = match self.search_raw(role, limit).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "job search failed, continuing with no postings");
                return Vec::new();
            }
        };

        // Tavily wraps hits in a `results` array; anything else goes to the
        // normalizer as-is.
        let results = raw.get("results").unwrap_or(&raw);
        let postings = normalize(results);

        debug!(count = postings.len(), "job search results normalized");
        postings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_extracts_results_array() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "query": "rust engineer",
            "results": [
                {"url": "https://jobs.example.com/1", "content": "Rust, Tokio, gRPC"},
                {"url": "https://jobs.example.com/2"},
            ],
        });
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let search = TavilySearch::new(format!("{}/search", server.uri()), "test-key").unwrap();
        let postings = search.search("Rust Engineer", 5).await;

        assert_eq!(postings.len(), 2);
        assert_eq!(
            postings[0].url.as_deref(),
            Some("https://jobs.example.com/1")
        );
    }

    #[tokio::test]
    async fn http_failure_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let search = TavilySearch::new(format!("{}/search", server.uri()), "test-key").unwrap();
        assert!(search.search("Data Scientist", 5).await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_empty() {
        // Nothing is listening on this port.
        let search = TavilySearch::new("http://127.0.0.1:1/search", "test-key").unwrap();
        assert!(search.search("Data Scientist", 5).await.is_empty());
    }
}
