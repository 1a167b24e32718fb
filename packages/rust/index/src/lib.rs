//! Chunking, embedding, and vector retrieval over posting text.
//!
//! This crate owns the middle of the evidence pipeline: posting text is
//! split into overlapping token windows ([`chunk_text`]), embedded through
//! an [`Embedder`], and served back as ranked evidence by [`VectorIndex`].
//! Index unavailability is a *degraded-mode* signal, never a crash.

mod chunker;
mod embedder;
mod store;

pub use chunker::{CHUNK_OVERLAP_TOKENS, CHUNK_SIZE_TOKENS, chunk_text, chunk_with};
pub use embedder::{Embedder, OllamaEmbedder};
pub use store::VectorIndex;
