//! Pattern-based skill vocabulary.
//!
//! A single table of case-insensitive, word-bounded regexes covering the
//! technical skills the analysis recognizes in résumé text. Extraction is
//! deterministic: matched names are lowercased and collected into an ordered
//! set, so the same résumé always yields the same skill list.

use std::collections::BTreeSet;

use regex::Regex;
use tracing::warn;

/// Built-in vocabulary, one pattern per skill family. Each pattern has a
/// single capture group holding the skill name.
///
/// `c++` lives in its own entry without a trailing `\b`: `+` is not a word
/// character, so a closing boundary there can never match.
const BUILTIN_PATTERNS: &[&str] = &[
    // Languages
    r"(?i)\b(python|java|javascript|sql|r|scala|golang?|rust)\b",
    r"(?i)\b(c\+\+)",
    // Frameworks
    r"(?i)\b(react|angular|vue|node\.?js|express|django|flask|spring)\b",
    // Cloud and tooling
    r"(?i)\b(aws|azure|gcp|docker|kubernetes|git|jenkins)\b",
    // Data and ML libraries
    r"(?i)\b(pandas|numpy|scikit-learn|tensorflow|pytorch|matplotlib)\b",
    // ML platforms and orchestration
    r"(?i)\b(mlflow|airflow|spark|langchain|faiss|chroma|transformers|llm|prompt engineering)\b",
    // Databases
    r"(?i)\b(mysql|postgresql|mongodb|redis|elasticsearch)\b",
    // Web
    r"(?i)\b(html|css|bootstrap|tailwind|sass)\b",
    // Methodologies
    r"(?i)\b(agile|scrum|devops|ci/cd|microservices)\b",
];

/// Compiled skill vocabulary.
pub struct SkillVocabulary {
    patterns: Vec<Regex>,
}

impl SkillVocabulary {
    /// Built-in vocabulary only.
    pub fn builtin() -> Self {
        Self::with_extra_patterns(&[])
    }

    /// Built-in vocabulary plus user-supplied patterns from config.
    ///
    /// Malformed extra patterns are skipped with a warning rather than
    /// failing the whole analysis.
    pub fn with_extra_patterns(extra: &[String]) -> Self {
        let mut patterns = Vec::with_capacity(BUILTIN_PATTERNS.len() + extra.len());

        for source in BUILTIN_PATTERNS {
            match Regex::new(source) {
                Ok(re) => patterns.push(re),
                Err(e) => warn!(pattern = source, error = %e, "built-in skill pattern rejected"),
            }
        }

        for source in extra {
            match Regex::new(source) {
                Ok(re) => patterns.push(re),
                Err(e) => {
                    warn!(pattern = %source, error = %e, "ignoring malformed skill pattern from config")
                }
            }
        }

        Self { patterns }
    }

    /// Extract the set of recognized skills from free text, lowercased and
    /// deduplicated in lexicographic order.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let mut skills = BTreeSet::new();
        for pattern in &self.patterns {
            for caps in pattern.captures_iter(text) {
                if let Some(m) = caps.get(1) {
                    skills.insert(m.as_str().to_lowercase());
                }
            }
        }
        skills
    }

    /// Extracted skills as a sorted vector, for prompt rendering.
    pub fn extract_sorted(&self, text: &str) -> Vec<String> {
        self.extract(text).into_iter().collect()
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_known_skills_case_insensitively() {
        let vocab = SkillVocabulary::builtin();
        let skills = vocab.extract("Senior engineer: Python, DOCKER, PostgreSQL and Scikit-Learn");
        assert!(skills.contains("python"));
        assert!(skills.contains("docker"));
        assert!(skills.contains("postgresql"));
        assert!(skills.contains("scikit-learn"));
    }

    #[test]
    fn word_boundaries_prevent_substring_matches() {
        let vocab = SkillVocabulary::builtin();
        // "rust" inside "trust", "java" inside "javascript"
        let skills = vocab.extract("a trustworthy javascript developer");
        assert!(!skills.contains("rust"));
        assert!(!skills.contains("java"));
        assert!(skills.contains("javascript"));
    }

    #[test]
    fn cpp_is_recognized() {
        let vocab = SkillVocabulary::builtin();
        let skills = vocab.extract("10 years of C++ experience");
        assert!(skills.contains("c++"));
    }

    #[test]
    fn output_is_sorted_and_deduplicated() {
        let vocab = SkillVocabulary::builtin();
        let skills = vocab.extract_sorted("sql and SQL and python and sql");
        assert_eq!(skills, vec!["python".to_string(), "sql".to_string()]);
    }

    #[test]
    fn extra_patterns_extend_the_vocabulary() {
        let vocab =
            SkillVocabulary::with_extra_patterns(&[r"(?i)\b(cobol|fortran)\b".to_string()]);
        let skills = vocab.extract("legacy COBOL systems");
        assert!(skills.contains("cobol"));
    }

    #[test]
    fn malformed_extra_pattern_is_ignored() {
        let vocab = SkillVocabulary::with_extra_patterns(&["(((".to_string()]);
        let skills = vocab.extract("python");
        assert!(skills.contains("python"));
    }

    #[test]
    fn empty_text_yields_no_skills() {
        let vocab = SkillVocabulary::builtin();
        assert!(vocab.extract("").is_empty());
    }
}
