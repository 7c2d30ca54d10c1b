//! Prompts for the document-transformation pipeline.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing how chunks are framed or which
//!    JSON shape the synthesis call demands requires editing exactly one
//!    place.
//!
//! 2. **Testability** — unit tests can inspect the assembled prompts without
//!    a live model, so a prompt regression shows up as a failing assertion.

/// System prompt for transforming one chunk of a larger document.
pub const CHUNK_SYSTEM_PROMPT: &str = r#"You are an expert document editor. You receive one part of a larger document together with the user's processing instructions.

Follow these rules precisely:

1. Apply the instructions to this part only; other parts are processed separately.
2. Produce clean, well-structured Markdown: headings, lists, emphasis, and GFM tables where the content calls for them.
3. Preserve the meaning and factual content of the source text.
4. Do not add introductions, conclusions, or commentary about the task.
5. Output ONLY the transformed Markdown. Do not wrap it in ``` fences."#;

/// Build the user message for one chunk.
///
/// `position` is 1-based; telling the model where the part sits in the whole
/// keeps it from opening every chunk with a fresh document title.
pub fn chunk_prompt(text: &str, position: usize, total: usize, instructions: &str) -> String {
    format!(
        "Instructions: {instructions}\n\n\
         This is part {position} of {total} of the document.\n\n\
         \"\"\"\n{text}\n\"\"\""
    )
}

/// System prompt for the single-call path on small documents.
pub const SMALL_SYSTEM_PROMPT: &str = r#"You are an expert document editor. You receive a complete document together with the user's processing instructions.

Transform the document according to the instructions and respond with a single JSON object, and nothing else:

{"title": "...", "content": "...", "tags": ["..."], "summary": "..."}

- "title": a concise document title
- "content": the full transformed document as Markdown
- "tags": 2-5 short topical tags
- "summary": 1-2 sentences describing the document"#;

/// Build the user message for the small-document path.
pub fn small_document_prompt(content: &str, instructions: &str) -> String {
    format!("Instructions: {instructions}\n\n\"\"\"\n{content}\n\"\"\"")
}

/// System prompt for the metadata-synthesis call on the chunked path.
pub const SYNTHESIS_SYSTEM_PROMPT: &str = r#"You derive document metadata. You receive the filename, the user's processing instructions, and the beginning of an already-transformed document.

Respond with a single JSON object, and nothing else:

{"title": "...", "tags": ["..."], "summary": "..."}

- "title": a concise document title
- "tags": 2-5 short topical tags
- "summary": 1-2 sentences describing the document"#;

/// Build the user message for the metadata-synthesis call.
///
/// Only an excerpt of the assembled document is supplied; the full text has
/// already been paid for once per chunk and metadata does not need all of it.
pub fn synthesis_prompt(filename: &str, instructions: &str, excerpt: &str) -> String {
    format!(
        "Filename: {filename}\n\
         Instructions: {instructions}\n\n\
         Document (beginning):\n\"\"\"\n{excerpt}\n\"\"\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_prompt_carries_position_and_instructions() {
        let p = chunk_prompt("Some text.", 2, 5, "summarize");
        assert!(p.contains("part 2 of 5"));
        assert!(p.contains("summarize"));
        assert!(p.contains("Some text."));
    }

    #[test]
    fn synthesis_prompt_carries_filename() {
        let p = synthesis_prompt("report.txt", "summarize", "# Q3 Report");
        assert!(p.contains("report.txt"));
        assert!(p.contains("# Q3 Report"));
    }

    #[test]
    fn json_shapes_are_spelled_out() {
        assert!(SMALL_SYSTEM_PROMPT.contains(r#""title""#));
        assert!(SMALL_SYSTEM_PROMPT.contains(r#""content""#));
        assert!(SYNTHESIS_SYSTEM_PROMPT.contains(r#""tags""#));
        assert!(!SYNTHESIS_SYSTEM_PROMPT.contains(r#""content""#));
    }
}
