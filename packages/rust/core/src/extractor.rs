//! Skill and evidence extraction strategies.
//!
//! The pipeline prefers the indexed strategy (vocabulary skills plus
//! similarity-retrieved evidence) and falls back to the pattern-only
//! strategy when the embedding backend or index is unavailable.

use async_trait::async_trait;
use tracing::{debug, instrument};

use skillgap_index::{Embedder, VectorIndex};
use skillgap_shared::Result;

use crate::vocabulary::SkillVocabulary;

/// How many fallback evidence snippets to keep, and how long each may be.
const FALLBACK_EVIDENCE_COUNT: usize = 3;
const FALLBACK_EVIDENCE_CHARS: usize = 500;

/// What an extraction strategy produces: the candidate's recognized skills
/// and the job-market evidence to ground the report in.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub skills: Vec<String>,
    pub evidence: Vec<String>,
}

/// Strategy for turning résumé text into skills and evidence.
#[async_trait]
pub trait SkillExtractor: Send + Sync {
    async fn extract(&self, resume_text: &str) -> Result<Extraction>;
}

// ---------------------------------------------------------------------------
// Indexed strategy
// ---------------------------------------------------------------------------

/// Full-fidelity extraction: vocabulary skills plus the `k` indexed posting
/// chunks most similar to the résumé.
pub struct IndexedExtractor<'a> {
    pub vocabulary: &'a SkillVocabulary,
    pub index: &'a VectorIndex,
    pub embedder: &'a dyn Embedder,
    pub k: usize,
}

#[async_trait]
impl SkillExtractor for IndexedExtractor<'_> {
    #[instrument(skip_all, fields(k = self.k))]
    async fn extract(&self, resume_text: &str) -> Result<Extraction> {
        let skills = self.vocabulary.extract_sorted(resume_text);
        let evidence = self.index.query(self.embedder, resume_text, self.k).await?;

        debug!(
            skills = skills.len(),
            evidence = evidence.len(),
            "indexed extraction complete"
        );
        Ok(Extraction { skills, evidence })
    }
}

// ---------------------------------------------------------------------------
// Fallback strategy
// ---------------------------------------------------------------------------

/// Degraded-mode extraction: vocabulary skills plus truncated leading
/// posting texts standing in for retrieved evidence.
pub struct FallbackExtractor<'a> {
    pub vocabulary: &'a SkillVocabulary,
    pub posting_texts: &'a [String],
}

#[async_trait]
impl SkillExtractor for FallbackExtractor<'_> {
    #[instrument(skip_all)]
    async fn extract(&self, resume_text: &str) -> Result<Extraction> {
        let skills = self.vocabulary.extract_sorted(resume_text);
        let evidence = self
            .posting_texts
            .iter()
            .take(FALLBACK_EVIDENCE_COUNT)
            .map(|text| truncate_snippet(text, FALLBACK_EVIDENCE_CHARS))
            .collect();

        Ok(Extraction { skills, evidence })
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
fn truncate_snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut snippet: String = text.chars().take(max_chars).collect();
    snippet.push_str("...");
    snippet
}
