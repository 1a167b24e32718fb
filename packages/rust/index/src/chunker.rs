//! Deterministic token-window chunking of posting text.
//!
//! Chunks are byte-exact substrings of the input: consecutive windows of
//! `size` whitespace tokens, advancing `size - overlap` tokens at a time.
//! The first chunk starts at byte 0 and the last ends at the final byte, so
//! concatenating each chunk's non-overlapping prefix reconstructs the
//! original text with no gaps.

/// Target window size in tokens.
pub const CHUNK_SIZE_TOKENS: usize = 800;

/// Tokens shared between consecutive windows, so no evidence silently
/// spans a chunk boundary.
pub const CHUNK_OVERLAP_TOKENS: usize = 120;

/// Chunk text with the default window size and overlap.
pub fn chunk_text(text: &str) -> Vec<String> {
    chunk_with(text, CHUNK_SIZE_TOKENS, CHUNK_OVERLAP_TOKENS)
}

/// Chunk text into windows of `size` tokens with `overlap` shared tokens.
///
/// Empty input yields no chunks; input at or below one window yields the
/// text unchanged as a single chunk.
pub fn chunk_with(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if size == 0 || text.is_empty() {
        return Vec::new();
    }
    let overlap = overlap.min(size.saturating_sub(1));
    let step = size - overlap;

    let spans = token_spans(text);
    let n = spans.len();

    if n == 0 {
        // Whitespace-only input still counts as one (degenerate) chunk.
        return vec![text.to_string()];
    }
    if n <= size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start_tok = 0;

    loop {
        let start_byte = if start_tok == 0 { 0 } else { spans[start_tok].0 };
        let end_tok = (start_tok + size).min(n);
        let end_byte = if end_tok == n {
            text.len()
        } else {
            spans[end_tok - 1].1
        };

        chunks.push(text[start_byte..end_byte].to_string());

        if end_tok == n {
            break;
        }
        start_tok += step;
    }

    chunks
}

/// Byte spans `(start, end)` of each whitespace-delimited token.
fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }

    spans
}
