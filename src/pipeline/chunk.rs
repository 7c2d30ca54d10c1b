//! Sentence-boundary chunking under a token budget.
//!
//! ## Why sentence boundaries?
//!
//! Chunks are transformed independently, so a boundary in the middle of a
//! sentence would hand the model a fragment it cannot make sense of and
//! produce Markdown that reads broken at every seam. Sentences are the
//! smallest unit that survives being cut apart.
//!
//! The splitter is deliberately naive — terminators `.` `!` `?` end a
//! sentence, consecutive terminators (`...`, `?!`) stay attached to it.
//! Abbreviations like "e.g." split too early, which costs nothing: a chunk
//! boundary between "e.g." and the rest is still a valid boundary, just not a
//! pretty one.
//!
//! A lone sentence whose estimate already exceeds the budget is emitted
//! unmodified as its own chunk. Truncating it would silently drop content;
//! sending it whole merely risks a longer model call.

use crate::estimate::estimate_tokens;
use serde::{Deserialize, Serialize};

/// A bounded, ordered slice of extracted text.
///
/// Indices are contiguous `0..N-1` in original textual order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

/// Split `text` into ordered chunks whose estimates stay within
/// `max_tokens_per_chunk`.
///
/// Greedy: sentences accumulate into the running chunk while the combined
/// estimate stays within budget; the first sentence that would overflow
/// closes the chunk and starts the next one. Leftover content is flushed as
/// a final chunk. Deterministic — identical input yields identical
/// boundaries.
pub fn chunk_text(text: &str, max_tokens_per_chunk: usize) -> Vec<Chunk> {
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        let candidate = if current.is_empty() {
            sentence.clone()
        } else {
            format!("{current} {sentence}")
        };

        if estimate_tokens(&candidate) <= max_tokens_per_chunk {
            current = candidate;
        } else {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            // An over-budget lone sentence sits here until the next iteration
            // closes it, ending up whole in its own chunk.
            current = sentence;
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk { index, text })
        .collect()
}

/// Split text into sentence-like units, discarding empty fragments.
///
/// Terminators stay attached to their sentence; runs of terminators are kept
/// together so ellipses and "?!" don't produce stray fragments.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if is_terminator(ch) {
            while let Some(&next) = chars.peek() {
                if !is_terminator(next) {
                    break;
                }
                current.push(next);
                chars.next();
            }
            flush_sentence(&mut current, &mut sentences);
        }
    }
    flush_sentence(&mut current, &mut sentences);

    sentences
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

fn flush_sentence(current: &mut String, sentences: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 100).is_empty());
        assert!(chunk_text("   \n\t ", 100).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("Hello world. This is a test.", 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "Hello world. This is a test.");
    }

    #[test]
    fn text_without_terminators_is_one_chunk() {
        let chunks = chunk_text("no punctuation at all", 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "no punctuation at all");
    }

    #[test]
    fn indices_are_contiguous_and_ordered() {
        // 20 sentences of 40 chars ≈ 10 tokens each, budget 25 → many chunks.
        let text: String = (0..20)
            .map(|i| format!("Sentence number {i:02} with filler padding."))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunk_text(&text, 25);
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn chunks_respect_the_token_budget() {
        let text: String = (0..30)
            .map(|i| format!("Sentence {i} keeps marching along steadily."))
            .collect::<Vec<_>>()
            .join(" ");
        for chunk in chunk_text(&text, 30) {
            assert!(
                estimate_tokens(&chunk.text) <= 30,
                "chunk {} over budget: {} tokens",
                chunk.index,
                estimate_tokens(&chunk.text)
            );
        }
    }

    #[test]
    fn oversized_lone_sentence_is_emitted_whole() {
        let long = format!("{} without a single break", "word ".repeat(100));
        let text = format!("Short one. {long}. Another short one.");
        let chunks = chunk_text(&text, 20);

        let oversized: Vec<_> = chunks
            .iter()
            .filter(|c| estimate_tokens(&c.text) > 20)
            .collect();
        assert_eq!(oversized.len(), 1, "exactly one over-budget chunk");
        assert!(oversized[0].text.contains("without a single break"));
        // Nothing was truncated.
        assert!(oversized[0].text.ends_with("without a single break."));
    }

    #[test]
    fn chunking_is_idempotent() {
        let text: String = (0..15)
            .map(|i| format!("Line {i} of the repeated document!"))
            .collect::<Vec<_>>()
            .join(" ");
        let first = chunk_text(&text, 20);
        let second = chunk_text(&text, 20);
        assert_eq!(first, second);
    }

    #[test]
    fn content_words_survive_in_order() {
        let text = "Alpha beta. Gamma delta! Epsilon zeta? Eta theta.";
        let chunks = chunk_text(&text, 5);
        let rejoined: String = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let original_words: Vec<&str> = text.split_whitespace().collect();
        let rejoined_words: Vec<&str> = rejoined.split_whitespace().collect();
        assert_eq!(original_words, rejoined_words);
    }

    #[test]
    fn ellipses_stay_with_their_sentence() {
        let sentences = split_sentences("Wait... what?! Fine.");
        assert_eq!(sentences, vec!["Wait...", "what?!", "Fine."]);
    }

    #[test]
    fn empty_fragments_are_discarded() {
        let sentences = split_sentences("One. . Two.");
        // The lone terminator between sentences forms its own unit; blank
        // fragments around it never appear.
        assert!(sentences.iter().all(|s| !s.trim().is_empty()));
        assert!(sentences.contains(&"One.".to_string()));
        assert!(sentences.contains(&"Two.".to_string()));
    }
}
