//! Shared types, error model, and configuration for skillgap.
//!
//! This crate is the foundation depended on by all other skillgap crates.
//! It provides:
//! - [`SkillgapError`] — the unified error type
//! - Domain types ([`Posting`], [`RunId`], [`MIN_CONTENT_LEN`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, IndexConfig, OllamaConfig, SearchConfig, SkillsConfig, config_dir,
    config_file_path, expand_home, init_config, load_config, load_config_from, search_api_key,
};
pub use error::{Result, SkillgapError};
pub use types::{MIN_CONTENT_LEN, Posting, RunId};
