//! Embedding-backed similarity index over posting chunks.
//!
//! The index is a flat table of (content hash, chunk text, vector) rows,
//! ranked by cosine similarity at query time and persisted as JSON under a
//! run-scoped collection directory. It is rebuilt per analysis run; there is
//! no incremental-update or durability contract.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use skillgap_shared::{Result, RunId, SkillgapError};
use tracing::{debug, info, instrument};

use crate::embedder::Embedder;

/// File name of the persisted index inside its collection directory.
const INDEX_FILE_NAME: &str = "index.json";

/// One indexed chunk with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexedChunk {
    /// SHA-256 of the chunk text.
    id: String,
    /// The chunk text, quoted verbatim as evidence when retrieved.
    text: String,
    /// Embedding vector.
    embedding: Vec<f32>,
}

/// Similarity index over posting chunks.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    collection: String,
    chunks: Vec<IndexedChunk>,
}

impl VectorIndex {
    /// Embed `chunks` and persist the index under
    /// `<storage_dir>/<collection>-<run>/index.json`.
    ///
    /// Any embedding or I/O failure here is the degraded-mode signal; the
    /// caller must not treat it as fatal.
    #[instrument(skip_all, fields(collection = %collection, chunks = chunks.len()))]
    pub async fn build(
        embedder: &dyn Embedder,
        chunks: &[String],
        collection: &str,
        storage_dir: &Path,
        run: &RunId,
    ) -> Result<Self> {
        let embeddings = embedder.embed_batch(chunks).await?;
        if embeddings.len() != chunks.len() {
            return Err(SkillgapError::Index(format!(
                "embedding count mismatch: {} chunks, {} vectors",
                chunks.len(),
                embeddings.len()
            )));
        }

        let index = Self {
            collection: collection.to_string(),
            chunks: chunks
                .iter()
                .zip(embeddings)
                .map(|(text, embedding)| IndexedChunk {
                    id: content_hash(text),
                    text: text.clone(),
                    embedding,
                })
                .collect(),
        };

        let dir = storage_dir.join(format!("{collection}-{run}"));
        index.persist(&dir)?;

        info!(chunks = index.chunks.len(), dir = %dir.display(), "vector index built");
        Ok(index)
    }

    /// Write the index to `<dir>/index.json`.
    fn persist(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|e| SkillgapError::io(dir, e))?;
        let path = dir.join(INDEX_FILE_NAME);
        let json = serde_json::to_string(self)
            .map_err(|e| SkillgapError::Index(format!("serialize index: {e}")))?;
        std::fs::write(&path, json).map_err(|e| SkillgapError::io(&path, e))
    }

    /// Load a previously persisted index from its collection directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE_NAME);
        let json = std::fs::read_to_string(&path).map_err(|e| SkillgapError::io(&path, e))?;
        serde_json::from_str(&json)
            .map_err(|e| SkillgapError::Index(format!("deserialize index: {e}")))
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Retrieve the `k` chunks most similar to `text`, best first.
    pub async fn query(
        &self,
        embedder: &dyn Embedder,
        text: &str,
        k: usize,
    ) -> Result<Vec<String>> {
        if self.chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = embedder.embed(text).await?;

        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .chunks
            .iter()
            .map(|c| (cosine_similarity(&query_vec, &c.embedding), c))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        debug!(
            k,
            best = scored.first().map(|(s, _)| *s).unwrap_or(0.0),
            "similarity query ranked"
        );

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, c)| c.text.clone())
            .collect())
    }

    /// Path of the persisted index file inside a collection directory.
    pub fn index_file(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE_NAME)
    }
}

/// Cosine similarity; 0 for mismatched dimensions or zero-norm vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// SHA-256 hex digest of chunk text, used as a stable row id.
fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic embedder: counts occurrences of marker words so tests
    /// can steer similarity without a model.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            let count = |needle: &str| lower.matches(needle).count() as f32;
            Ok(vec![count("python"), count("rust"), count("sql"), 1.0])
        }
    }

    /// Embedder that always fails, for degraded-path tests.
    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(SkillgapError::Index("embedding service down".into()))
        }
    }

    fn chunks() -> Vec<String> {
        vec![
            "python python python data pipelines".to_string(),
            "rust services and tokio".to_string(),
            "sql warehouse modeling".to_string(),
        ]
    }

    #[tokio::test]
    async fn query_ranks_by_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let index = VectorIndex::build(
            &KeywordEmbedder,
            &chunks(),
            "job_postings",
            dir.path(),
            &RunId::new(),
        )
        .await
        .unwrap();

        let hits = index
            .query(&KeywordEmbedder, "strong python experience", 2)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].contains("python"));
    }

    #[tokio::test]
    async fn build_persists_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunId::new();
        let index = VectorIndex::build(&KeywordEmbedder, &chunks(), "job_postings", dir.path(), &run)
            .await
            .unwrap();

        let collection_dir = dir.path().join(format!("job_postings-{run}"));
        assert!(VectorIndex::index_file(&collection_dir).exists());

        let loaded = VectorIndex::load(&collection_dir).unwrap();
        assert_eq!(loaded.len(), index.len());
    }

    #[tokio::test]
    async fn broken_embedder_fails_build_not_panics() {
        let dir = tempfile::tempdir().unwrap();
        let err = VectorIndex::build(
            &BrokenEmbedder,
            &chunks(),
            "job_postings",
            dir.path(),
            &RunId::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SkillgapError::Index(_)));
    }

    #[tokio::test]
    async fn empty_index_queries_to_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let index = VectorIndex::build(&KeywordEmbedder, &[], "job_postings", dir.path(), &RunId::new())
            .await
            .unwrap();
        assert!(index.is_empty());
        assert!(
            index
                .query(&KeywordEmbedder, "anything", 5)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn cosine_similarity_edge_cases() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }
}
