//! Heuristic token estimation.
//!
//! `estimate_tokens` divides the character count by four and rounds up — the
//! common rule of thumb for English prose under BPE tokenisers. It is not a
//! real tokeniser: the point is a cheap, deterministic number that is stable
//! across requests, good enough to pick the small-vs-chunked branch and to
//! size chunk boundaries. Both decisions leave generous headroom, so being
//! off by ±20 % against the provider's true count is acceptable.

/// Estimate the token count of `text` as `ceil(chars / 4)`.
///
/// Pure and deterministic; returns 0 for the empty string.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
