//! Core pipeline orchestration and domain logic for skillgap.
//!
//! This crate ties together job search, posting fetch, vector indexing,
//! skill extraction, and report generation into the end-to-end
//! `run_analysis` workflow.

pub mod extractor;
pub mod pipeline;
pub mod vocabulary;

pub use extractor::{Extraction, FallbackExtractor, IndexedExtractor, SkillExtractor};
pub use pipeline::{
    AnalysisConfig, AnalysisDeps, AnalysisReport, GENERATION_ERROR_PREFIX, GENERATOR_UNAVAILABLE,
    ProgressReporter, SilentProgress, run_analysis,
};
pub use vocabulary::SkillVocabulary;
