//! Application configuration for skillgap.
//!
//! User config lives at `~/.skillgap/skillgap.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in the file — the config holds the name of the
//! environment variable that carries them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillgapError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "skillgap.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".skillgap";

// ---------------------------------------------------------------------------
// Config structs (matching skillgap.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Job-search provider settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Ollama (generation + embedding) settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Vector-index storage settings.
    #[serde(default)]
    pub index: IndexConfig,

    /// Skill-vocabulary extensions.
    #[serde(default)]
    pub skills: SkillsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum number of job postings requested from search.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Number of evidence chunks retrieved per résumé query.
    #[serde(default = "default_evidence_k")]
    pub evidence_k: usize,

    /// Pause between consecutive posting fetches, in milliseconds.
    #[serde(default = "default_fetch_pacing_ms")]
    pub fetch_pacing_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            evidence_k: default_evidence_k(),
            fetch_pacing_ms: default_fetch_pacing_ms(),
        }
    }
}

fn default_search_limit() -> usize {
    5
}
fn default_evidence_k() -> usize {
    5
}
fn default_fetch_pacing_ms() -> u64 {
    1000
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the Tavily API key (never the key itself).
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Search API endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            endpoint: default_search_endpoint(),
        }
    }
}

fn default_search_key_env() -> String {
    "TAVILY_API_KEY".into()
}
fn default_search_endpoint() -> String {
    "https://api.tavily.com/search".into()
}

/// `[ollama]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model used to generate the gap-analysis report.
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Model used for chunk/query embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature (near-deterministic by default).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_ollama_model() -> String {
    "llama3.1".into()
}
fn default_embedding_model() -> String {
    "nomic-embed-text".into()
}
fn default_temperature() -> f32 {
    0.1
}

impl OllamaConfig {
    /// Base URL, with the `OLLAMA_BASE_URL` env var taking precedence.
    pub fn resolved_base_url(&self) -> String {
        std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| self.base_url.clone())
    }

    /// Generation model, with the `OLLAMA_MODEL` env var taking precedence.
    pub fn resolved_model(&self) -> String {
        std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| self.model.clone())
    }
}

/// `[index]` section.
///
/// Each analysis run builds its index under a run-scoped subdirectory of
/// `storage_dir`, so concurrent runs never share an index path. There is no
/// further isolation: the index is rebuilt per run and carries no durability
/// contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Root directory for on-disk indexes (`~` expanded at load time).
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// Logical collection name for posting chunks.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            collection: default_collection(),
        }
    }
}

fn default_storage_dir() -> String {
    "~/.skillgap/index".into()
}
fn default_collection() -> String {
    "job_postings".into()
}

/// `[skills]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// Extra skill regex patterns appended to the built-in vocabulary.
    /// Each pattern must contain one capture group naming the skill.
    #[serde(default)]
    pub extra_patterns: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.skillgap/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SkillgapError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.skillgap/skillgap.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SkillgapError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SkillgapError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SkillgapError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SkillgapError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SkillgapError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the search API key from the configured env var.
///
/// A missing or empty key disables posting discovery (the pipeline continues
/// with zero postings); it is not an error.
pub fn search_api_key(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.search.api_key_env) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("TAVILY_API_KEY"));
        assert!(toml_str.contains("embedding_model"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.search_limit, 5);
        assert_eq!(parsed.defaults.evidence_k, 5);
        assert_eq!(parsed.ollama.temperature, 0.1);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[ollama]
model = "mistral"

[skills]
extra_patterns = ['\b(terraform)\b']
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.ollama.model, "mistral");
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.skills.extra_patterns.len(), 1);
        assert_eq!(config.defaults.fetch_pacing_ms, 1000);
    }

    #[test]
    fn missing_search_key_is_none() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.search.api_key_env = "SKILLGAP_TEST_NONEXISTENT_KEY_98765".into();
        assert!(search_api_key(&config).is_none());
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/tmp/idx"), PathBuf::from("/tmp/idx"));
    }
}
