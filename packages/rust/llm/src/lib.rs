//! Report generation via a local Ollama server.
//!
//! The generation backend is the one dependency the pipeline cannot degrade
//! around: without it there is no report. [`Generate::warmup`] gives the
//! orchestrator its preflight smoke call; generation errors are surfaced so
//! the orchestrator can convert them into a user-facing error string.

pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skillgap_shared::{Result, SkillgapError};
use tracing::{debug, warn};

pub use prompt::{MAX_PROMPT_EVIDENCE, SKILLS_PLACEHOLDER, evidence_placeholder, render_prompt};

/// Timeout for one generation call. Reports are long; Ollama is slow.
const GENERATE_TIMEOUT_SECS: u64 = 300;

/// Attempts per generation call (retries cover 5xx and transport errors).
const MAX_ATTEMPTS: u32 = 3;

// ---------------------------------------------------------------------------
// Generate trait
// ---------------------------------------------------------------------------

/// Capability: produce text from a fully-rendered prompt.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Lightweight smoke call used by pipeline preflight.
    async fn warmup(&self) -> Result<()> {
        self.generate("Hello, this is a connection test.").await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ollama client
// ---------------------------------------------------------------------------

/// Generation client for an Ollama server (`POST /api/generate`).
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Build a generation client for the given base URL, model, and
    /// sampling temperature (near-deterministic in production config).
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(GENERATE_TIMEOUT_SECS))
            .build()
            .map_err(|e| SkillgapError::Generation(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
        })
    }

    async fn call_once(&self, prompt: &str) -> std::result::Result<String, GenerateFailure> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                GenerateFailure::Retryable(SkillgapError::Generation(format!(
                    "generation request: {e}"
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = SkillgapError::Generation(format!(
                "generation backend returned HTTP {status}: {body}"
            ));
            // 5xx means the server hiccuped; 4xx (missing model, bad
            // request) will not improve with a retry.
            return if status.is_server_error() {
                Err(GenerateFailure::Retryable(err))
            } else {
                Err(GenerateFailure::Terminal(err))
            };
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            GenerateFailure::Terminal(SkillgapError::Generation(format!(
                "generation response body: {e}"
            )))
        })?;

        if parsed.response.trim().is_empty() {
            return Err(GenerateFailure::Terminal(SkillgapError::Generation(
                "generation backend returned empty output".into(),
            )));
        }

        Ok(parsed.response)
    }
}

enum GenerateFailure {
    Terminal(SkillgapError),
    Retryable(SkillgapError),
}

#[async_trait]
impl Generate for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 2)));
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "generation attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }

            match self.call_once(prompt).await {
                Ok(text) => {
                    debug!(model = %self.model, chars = text.len(), "generation succeeded");
                    return Ok(text);
                }
                Err(GenerateFailure::Retryable(e)) => last_error = Some(e),
                Err(GenerateFailure::Terminal(e)) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| SkillgapError::Generation("generation failed".into())))
    }
}
