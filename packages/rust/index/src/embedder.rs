//! Text embedding via the Ollama embeddings API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skillgap_shared::{Result, SkillgapError};
use tracing::debug;

/// Timeout for one embedding call.
const EMBED_TIMEOUT_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// Embedder trait
// ---------------------------------------------------------------------------

/// Capability: turn text into a fixed-dimension vector.
///
/// Any error here is the orchestrator's signal to switch to degraded
/// (pattern-only) skill extraction.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Lightweight smoke call used by pipeline preflight.
    async fn warmup(&self) -> Result<()> {
        self.embed("embedding service connection test").await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ollama client
// ---------------------------------------------------------------------------

/// Embedding client for an Ollama server (`POST /api/embeddings`).
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    /// Build an embedder against the given Ollama base URL and model.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(EMBED_TIMEOUT_SECS))
            .build()
            .map_err(|e| SkillgapError::Index(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| SkillgapError::Index(format!("embedding request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SkillgapError::Index(format!(
                "embedding service returned HTTP {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| SkillgapError::Index(format!("embedding response body: {e}")))?;

        if parsed.embedding.is_empty() {
            return Err(SkillgapError::Index("embedding service returned an empty vector".into()));
        }

        debug!(model = %self.model, dims = parsed.embedding.len(), "embedded text");
        Ok(parsed.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn embed_parses_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(serde_json::json!({"model": "test-embed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embedding": [0.1, 0.2, 0.3],
            })))
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(server.uri(), "test-embed").unwrap();
        let vector = embedder.embed("some posting text").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn server_error_is_an_index_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(server.uri(), "test-embed").unwrap();
        let err = embedder.embed("text").await.unwrap_err();
        assert!(matches!(err, SkillgapError::Index(_)));
        assert!(embedder.warmup().await.is_err());
    }

    #[tokio::test]
    async fn batch_embeds_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embedding": [1.0],
            })))
            .expect(2)
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(server.uri(), "test-embed").unwrap();
        let vectors = embedder
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 2);
    }
}
