//! Sequential chunk transformation with per-chunk failure tolerance.
//!
//! Chunks are processed strictly one at a time, never concurrently. All of a
//! host's requests share one provider quota, and a 40-chunk document fanned
//! out in parallel would eat the whole window in one burst; the sequential
//! loop plus a fixed inter-call delay trades latency for staying inside that
//! shared budget. This is a design constraint of the pipeline, not an
//! optimisation left on the table.
//!
//! A failed chunk never aborts the run. The failure is logged, a placeholder
//! naming the section takes the chunk's place in the output, and the loop
//! moves on — a reader of the assembled document sees exactly which section
//! was lost and everything around it intact.

use crate::config::ProcessingConfig;
use crate::error::ChunkFailure;
use crate::model::{CompletionClient, CompletionRequest, ModelError};
use crate::output::ChunkResult;
use crate::pipeline::chunk::Chunk;
use crate::pipeline::postprocess;
use crate::prompts;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Transform every chunk in order, one model call each.
///
/// The returned vector always has the same length and order as `chunks`;
/// failed chunks carry a placeholder and their [`ChunkFailure`].
pub async fn transform_chunks(
    client: &Arc<dyn CompletionClient>,
    chunks: &[Chunk],
    instructions: &str,
    config: &ProcessingConfig,
) -> Vec<ChunkResult> {
    let total = chunks.len();
    let mut results = Vec::with_capacity(total);

    for (i, chunk) in chunks.iter().enumerate() {
        // Delay between consecutive calls only — not before the first and
        // not after the last.
        if i > 0 && config.inter_call_delay_ms > 0 {
            sleep(Duration::from_millis(config.inter_call_delay_ms)).await;
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_chunk_start(chunk.index, total);
        }

        let result = transform_single(client, chunk, total, instructions, config).await;

        if let Some(ref cb) = config.progress_callback {
            match &result.error {
                None => cb.on_chunk_complete(chunk.index, total, result.output.len()),
                Some(e) => cb.on_chunk_error(chunk.index, total, e.to_string()),
            }
        }

        results.push(result);
    }

    results
}

/// Issue one bounded transform call for a single chunk.
///
/// Always returns a `ChunkResult` — errors become placeholders, never `Err`.
pub(crate) async fn transform_single(
    client: &Arc<dyn CompletionClient>,
    chunk: &Chunk,
    total: usize,
    instructions: &str,
    config: &ProcessingConfig,
) -> ChunkResult {
    let start = Instant::now();
    let request = CompletionRequest {
        system: prompts::CHUNK_SYSTEM_PROMPT.to_string(),
        prompt: prompts::chunk_prompt(&chunk.text, chunk.index + 1, total, instructions),
        max_output_tokens: config.chunk_output_tokens,
        temperature: config.temperature,
    };

    match client.complete(&request).await {
        Ok(text) => {
            let duration = start.elapsed();
            debug!(
                chunk = chunk.index,
                output_len = text.len(),
                elapsed_ms = duration.as_millis() as u64,
                "chunk transformed"
            );
            ChunkResult {
                index: chunk.index,
                output: postprocess::clean_markdown(&text),
                duration_ms: duration.as_millis() as u64,
                error: None,
            }
        }
        Err(e) => {
            let duration = start.elapsed();
            warn!(
                chunk = chunk.index,
                error = %e,
                "chunk transform failed; substituting placeholder"
            );
            ChunkResult {
                index: chunk.index,
                output: failure_placeholder(chunk.index, &e),
                duration_ms: duration.as_millis() as u64,
                error: Some(ChunkFailure::ModelCall {
                    index: chunk.index,
                    detail: e.to_string(),
                }),
            }
        }
    }
}

/// Visible stand-in for a chunk that could not be transformed.
pub(crate) fn failure_placeholder(index: usize, error: &ModelError) -> String {
    format!(
        "> **[Section {} could not be processed: {}]**",
        index + 1,
        short_note(&error.to_string())
    )
}

/// Trim a failure note so the placeholder stays one readable line.
fn short_note(detail: &str) -> String {
    const MAX: usize = 120;
    let one_line = detail.replace('\n', " ");
    if one_line.chars().count() <= MAX {
        one_line
    } else {
        let cut: String = one_line.chars().take(MAX - 1).collect();
        format!("{cut}\u{2026}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_names_the_section_and_cause() {
        let e = ModelError::Api {
            detail: "500 from provider".into(),
        };
        let p = failure_placeholder(2, &e);
        assert!(p.contains("Section 3"), "got: {p}");
        assert!(p.contains("500 from provider"));
    }

    #[test]
    fn long_failure_notes_are_truncated() {
        let detail = "x".repeat(400);
        let note = short_note(&detail);
        assert!(note.chars().count() <= 120);
        assert!(note.ends_with('\u{2026}'));
    }

    #[test]
    fn newlines_in_notes_are_flattened() {
        assert_eq!(short_note("line one\nline two"), "line one line two");
    }
}
