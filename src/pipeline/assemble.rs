//! Assembly: join chunk outputs in order and synthesise document metadata.
//!
//! Assembly is pure string work and cannot fail. Metadata synthesis issues
//! exactly one extra model call and tolerates everything that can go wrong
//! with it — a thrown error, a free-text reply, a degenerate JSON reply —
//! by falling back to deterministic defaults. A draft with a generic title
//! still carries all the transformed content the chunk calls paid for;
//! failing the request over a missing title would throw that work away.

use crate::config::{ChunkSeparator, ProcessingConfig};
use crate::model::{CompletionClient, CompletionRequest};
use crate::output::ChunkResult;
use crate::pipeline::parse::{parse_reply, ModelReply};
use crate::prompts;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tags guaranteed on every draft when synthesis yields none.
pub const DEFAULT_TAGS: [&str; 2] = ["document", "ai-processed"];

/// Summary guaranteed on every chunked-path draft when synthesis fails.
pub const DEFAULT_SUMMARY: &str = "Automatically processed document.";

/// Deterministic title fallback.
pub fn fallback_title(filename: &str) -> String {
    format!("Processed: {filename}")
}

/// Title, tags, and summary for the assembled draft.
#[derive(Debug, Clone)]
pub struct SynthesizedMetadata {
    pub title: String,
    pub tags: Vec<String>,
    pub summary: String,
    /// True when defaults substituted for a failed or unparsable synthesis.
    pub fell_back: bool,
}

/// Expected shape of the synthesis reply.
#[derive(Debug, Deserialize)]
struct SynthesisReply {
    title: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    summary: String,
}

/// Join chunk outputs in index order with the configured separator.
///
/// Failed chunks contribute their placeholder, so the document keeps its
/// original section order regardless of which calls succeeded.
pub fn assemble_content(results: &[ChunkResult], separator: &ChunkSeparator) -> String {
    let mut ordered: Vec<&ChunkResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.index);

    let mut parts: Vec<String> = Vec::with_capacity(ordered.len() * 2);
    for (i, result) in ordered.iter().enumerate() {
        if i > 0 {
            parts.push(separator.render(i + 1));
        }
        parts.push(result.output.trim_end().to_string());
    }

    let mut content = parts.join("");
    content.push('\n');
    content
}

/// Issue the single metadata-synthesis call, falling back deterministically.
///
/// Only a bounded prefix of the assembled text is sent; the synthesis call
/// exists to derive a title line and a couple of tags, not to re-read the
/// document.
pub async fn synthesize_metadata(
    client: &Arc<dyn CompletionClient>,
    filename: &str,
    instructions: &str,
    assembled: &str,
    config: &ProcessingConfig,
) -> SynthesizedMetadata {
    let excerpt: String = assembled
        .chars()
        .take(config.synthesis_prefix_chars)
        .collect();

    let request = CompletionRequest {
        system: prompts::SYNTHESIS_SYSTEM_PROMPT.to_string(),
        prompt: prompts::synthesis_prompt(filename, instructions, &excerpt),
        max_output_tokens: config.synthesis_output_tokens,
        temperature: config.temperature,
    };

    match client.complete(&request).await {
        Ok(raw) => match parse_reply::<SynthesisReply>(&raw) {
            ModelReply::Parsed(reply) => {
                debug!("metadata synthesis parsed");
                from_reply(reply, filename)
            }
            ModelReply::Fallback(_) => {
                warn!("synthesis reply was not the expected JSON; using default metadata");
                fallback_metadata(filename)
            }
        },
        Err(e) => {
            warn!(error = %e, "metadata synthesis call failed; using default metadata");
            fallback_metadata(filename)
        }
    }
}

/// Accept a parsed reply, guarding each field against degenerate values.
fn from_reply(reply: SynthesisReply, filename: &str) -> SynthesizedMetadata {
    let title = if reply.title.trim().is_empty() {
        fallback_title(filename)
    } else {
        reply.title.trim().to_string()
    };
    let tags: Vec<String> = reply
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let tags = if tags.is_empty() {
        default_tags()
    } else {
        tags
    };
    let summary = if reply.summary.trim().is_empty() {
        DEFAULT_SUMMARY.to_string()
    } else {
        reply.summary.trim().to_string()
    };

    SynthesizedMetadata {
        title,
        tags,
        summary,
        fell_back: false,
    }
}

/// The deterministic metadata used whenever synthesis cannot be trusted.
pub fn fallback_metadata(filename: &str) -> SynthesizedMetadata {
    SynthesizedMetadata {
        title: fallback_title(filename),
        tags: default_tags(),
        summary: DEFAULT_SUMMARY.to_string(),
        fell_back: true,
    }
}

pub(crate) fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkFailure;

    fn ok_chunk(index: usize, output: &str) -> ChunkResult {
        ChunkResult {
            index,
            output: output.to_string(),
            duration_ms: 1,
            error: None,
        }
    }

    #[test]
    fn assembles_in_index_order_with_separator() {
        // Deliberately shuffled input order.
        let results = vec![ok_chunk(1, "second\n"), ok_chunk(0, "first\n"), ok_chunk(2, "third\n")];
        let content = assemble_content(&results, &ChunkSeparator::HorizontalRule);
        assert_eq!(content, "first\n\n---\n\nsecond\n\n---\n\nthird\n");
    }

    #[test]
    fn failed_chunks_keep_their_place() {
        let results = vec![
            ok_chunk(0, "alpha\n"),
            ChunkResult {
                index: 1,
                output: "> **[Section 2 could not be processed: boom]**".into(),
                duration_ms: 1,
                error: Some(ChunkFailure::ModelCall {
                    index: 1,
                    detail: "boom".into(),
                }),
            },
            ok_chunk(2, "gamma\n"),
        ];
        let content = assemble_content(&results, &ChunkSeparator::Blank);
        let alpha = content.find("alpha").unwrap();
        let marker = content.find("Section 2").unwrap();
        let gamma = content.find("gamma").unwrap();
        assert!(alpha < marker && marker < gamma);
    }

    #[test]
    fn single_chunk_has_no_separator() {
        let content = assemble_content(&[ok_chunk(0, "only\n")], &ChunkSeparator::HorizontalRule);
        assert_eq!(content, "only\n");
    }

    #[test]
    fn fallback_metadata_is_never_empty() {
        let meta = fallback_metadata("report.txt");
        assert_eq!(meta.title, "Processed: report.txt");
        assert!(!meta.tags.is_empty());
        assert!(!meta.summary.is_empty());
        assert!(meta.fell_back);
    }

    #[test]
    fn parsed_reply_with_blank_fields_gets_defaults() {
        let meta = from_reply(
            SynthesisReply {
                title: "  ".into(),
                tags: vec!["".into(), "  ".into()],
                summary: String::new(),
            },
            "notes.md",
        );
        assert_eq!(meta.title, "Processed: notes.md");
        assert_eq!(meta.tags, default_tags());
        assert_eq!(meta.summary, DEFAULT_SUMMARY);
        assert!(!meta.fell_back);
    }
}
