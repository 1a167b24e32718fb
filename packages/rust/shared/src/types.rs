//! Core domain types for the skillgap pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum length, in characters, for posting text to count as real content.
/// Anything shorter (inline or fetched) is discarded as noise.
pub const MIN_CONTENT_LEN: usize = 100;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one analysis run (time-sortable).
///
/// Used to scope the on-disk index directory so concurrent runs never
/// collide on a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Posting
// ---------------------------------------------------------------------------

/// One discovered job posting, produced by the result normalizer and
/// consumed once by the content fetcher. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Where the posting can be fetched from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Posting text already embedded in the search result, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_text: Option<String>,
    /// Position in the normalized search output (0-based).
    pub rank: usize,
}

impl Posting {
    /// A posting known only by URL.
    pub fn from_url(url: impl Into<String>, rank: usize) -> Self {
        Self {
            url: Some(url.into()),
            inline_text: None,
            rank,
        }
    }

    /// A posting whose text came inline with the search result.
    pub fn from_text(text: impl Into<String>, rank: usize) -> Self {
        Self {
            url: None,
            inline_text: Some(text.into()),
            rank,
        }
    }

    /// Whether the inline text is long enough to use without a fetch.
    pub fn has_usable_inline_text(&self) -> bool {
        self.inline_text
            .as_deref()
            .is_some_and(|t| t.trim().len() > MIN_CONTENT_LEN)
    }
}
