//! End-to-end analysis pipeline: search → fetch → index → extract → report.
//!
//! The pipeline never returns an error to the caller. Every stage that can
//! fail has a degraded path: search failures yield zero postings, fetch
//! failures skip the posting, embedding/index failures switch extraction to
//! the pattern-only fallback, and generation failures produce an error
//! report string. The one hard prerequisite is the generation backend,
//! checked up front.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use skillgap_fetcher::Fetcher;
use skillgap_index::{Embedder, VectorIndex, chunk_text};
use skillgap_llm::{Generate, render_prompt};
use skillgap_search::JobSearch;
use skillgap_shared::{AppConfig, Posting, RunId, expand_home};

use crate::extractor::{Extraction, FallbackExtractor, IndexedExtractor, SkillExtractor};
use crate::vocabulary::SkillVocabulary;

/// Returned verbatim when the generation backend fails its preflight call.
pub const GENERATOR_UNAVAILABLE: &str = "Ollama service is not available. \
     Please ensure Ollama is running and the specified model is installed.";

/// Prefix of the report text when generation itself fails.
pub const GENERATION_ERROR_PREFIX: &str = "Error generating analysis:";

/// Configuration for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Target role the candidate is aiming for.
    pub role: String,
    /// Full résumé text.
    pub resume_text: String,
    /// Maximum number of postings requested from search.
    pub search_limit: usize,
    /// Number of evidence chunks retrieved per résumé query.
    pub evidence_k: usize,
    /// Pause between consecutive posting fetches.
    pub fetch_pacing: Duration,
    /// Root directory for persisted vector indexes.
    pub storage_dir: PathBuf,
    /// Index collection name; the run id is appended per run.
    pub collection: String,
}

impl AnalysisConfig {
    /// Build a run configuration from the loaded app config.
    pub fn from_app_config(
        role: impl Into<String>,
        resume_text: impl Into<String>,
        app: &AppConfig,
    ) -> Self {
        Self {
            role: role.into(),
            resume_text: resume_text.into(),
            search_limit: app.defaults.search_limit,
            evidence_k: app.defaults.evidence_k,
            fetch_pacing: Duration::from_millis(app.defaults.fetch_pacing_ms),
            storage_dir: expand_home(&app.index.storage_dir),
            collection: app.index.collection.clone(),
        }
    }
}

/// Backends the pipeline runs against. Search is optional: without an API
/// key the run proceeds with zero postings.
pub struct AnalysisDeps<'a> {
    pub search: Option<&'a dyn JobSearch>,
    pub fetcher: &'a Fetcher,
    pub embedder: &'a dyn Embedder,
    pub generator: &'a dyn Generate,
    pub vocabulary: &'a SkillVocabulary,
}

/// Outcome of an analysis run. `report` is always present, even when it
/// carries an error message instead of a gap analysis.
#[derive(Debug)]
pub struct AnalysisReport {
    /// The generated report (or a diagnostic string on hard failure).
    pub report: String,
    /// Skills recognized in the résumé.
    pub skills: Vec<String>,
    /// Number of evidence snippets that backed the prompt.
    pub evidence_count: usize,
    /// Postings returned by search.
    pub postings_found: usize,
    /// Postings that yielded usable text.
    pub postings_fetched: usize,
    /// Whether extraction fell back to pattern-only mode.
    pub degraded: bool,
    /// Run identifier (also names the persisted index directory).
    pub run_id: RunId,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each posting fetch attempt.
    fn posting_fetched(&self, label: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, outcome: &AnalysisReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn posting_fetched(&self, _label: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &AnalysisReport) {}
}

/// Run the full analysis pipeline.
///
/// 1. Preflight the generation backend (hard requirement)
/// 2. Search for job postings
/// 3. Fetch and clean posting text, paced
/// 4. Chunk and index the texts
/// 5. Extract skills and evidence (indexed or fallback)
/// 6. Generate the gap report
#[instrument(skip_all, fields(role = %config.role))]
pub async fn run_analysis(
    config: &AnalysisConfig,
    deps: &AnalysisDeps<'_>,
    progress: &dyn ProgressReporter,
) -> AnalysisReport {
    let start = Instant::now();
    let run_id = RunId::new();

    info!(%run_id, role = %config.role, "starting analysis run");

    // --- Phase 1: Preflight ---
    progress.phase("Checking generation backend");
    if let Err(e) = deps.generator.warmup().await {
        warn!(error = %e, "generation backend preflight failed");
        let outcome = AnalysisReport {
            report: GENERATOR_UNAVAILABLE.to_string(),
            skills: Vec::new(),
            evidence_count: 0,
            postings_found: 0,
            postings_fetched: 0,
            degraded: true,
            run_id,
            elapsed: start.elapsed(),
        };
        progress.done(&outcome);
        return outcome;
    }

    let mut degraded = false;
    if let Err(e) = deps.embedder.warmup().await {
        warn!(error = %e, "embedding backend unavailable, using pattern-only extraction");
        degraded = true;
    }

    // --- Phase 2: Search ---
    progress.phase("Searching for job postings");
    let postings: Vec<Posting> = match deps.search {
        Some(search) => search.search(&config.role, config.search_limit).await,
        None => {
            warn!("no search backend configured, continuing without postings");
            Vec::new()
        }
    };
    let postings_found = postings.len();
    info!(postings_found, "search complete");

    // --- Phase 3: Fetch ---
    progress.phase("Fetching job postings");
    let mut posting_texts = Vec::new();
    for (i, posting) in postings.iter().enumerate() {
        let label = posting.url.as_deref().unwrap_or("inline content");
        if let Some(text) = deps.fetcher.fetch(posting).await {
            posting_texts.push(text);
        }
        progress.posting_fetched(label, i + 1, postings_found);

        // Pace consecutive fetches; no pause after the last one.
        if i + 1 < postings_found && !config.fetch_pacing.is_zero() {
            tokio::time::sleep(config.fetch_pacing).await;
        }
    }
    let postings_fetched = posting_texts.len();
    info!(postings_fetched, postings_found, "fetch complete");

    if posting_texts.is_empty() {
        warn!("no usable posting text, report will lean on résumé skills only");
    }

    // --- Phase 4: Chunk and index ---
    let index = if degraded || posting_texts.is_empty() {
        None
    } else {
        progress.phase("Indexing posting text");
        let chunks: Vec<String> = posting_texts.iter().flat_map(|t| chunk_text(t)).collect();
        match VectorIndex::build(
            deps.embedder,
            &chunks,
            &config.collection,
            &config.storage_dir,
            &run_id,
        )
        .await
        {
            Ok(index) => Some(index),
            Err(e) => {
                warn!(error = %e, "index build failed, using pattern-only extraction");
                degraded = true;
                None
            }
        }
    };

    // --- Phase 5: Extract ---
    progress.phase("Extracting skills and evidence");
    let extraction = match &index {
        Some(index) => {
            let extractor = IndexedExtractor {
                vocabulary: deps.vocabulary,
                index,
                embedder: deps.embedder,
                k: config.evidence_k,
            };
            match extractor.extract(&config.resume_text).await {
                Ok(extraction) => extraction,
                Err(e) => {
                    warn!(error = %e, "indexed extraction failed, falling back");
                    degraded = true;
                    fallback_extract(deps.vocabulary, &config.resume_text, &posting_texts).await
                }
            }
        }
        None => fallback_extract(deps.vocabulary, &config.resume_text, &posting_texts).await,
    };
    info!(
        skills = extraction.skills.len(),
        evidence = extraction.evidence.len(),
        degraded,
        "extraction complete"
    );

    // --- Phase 6: Generate ---
    progress.phase("Generating gap analysis");
    let prompt = render_prompt(&config.role, &extraction.skills, &extraction.evidence);
    let report = match deps.generator.generate(&prompt).await {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "report generation failed");
            format!("{GENERATION_ERROR_PREFIX} {e}")
        }
    };

    let outcome = AnalysisReport {
        report,
        skills: extraction.skills,
        evidence_count: extraction.evidence.len(),
        postings_found,
        postings_fetched,
        degraded,
        run_id,
        elapsed: start.elapsed(),
    };
    info!(elapsed_ms = outcome.elapsed.as_millis() as u64, "analysis run finished");
    progress.done(&outcome);
    outcome
}

async fn fallback_extract(
    vocabulary: &SkillVocabulary,
    resume_text: &str,
    posting_texts: &[String],
) -> Extraction {
    let extractor = FallbackExtractor {
        vocabulary,
        posting_texts,
    };
    // The fallback strategy has no failing dependencies.
    extractor.extract(resume_text).await.unwrap_or_default()
}
