//! Output types returned by the pipeline.
//!
//! [`DocumentDraft`] is the artifact handed onward to the persistence layer.
//! [`ProcessingOutput`] wraps it together with per-chunk results and run
//! statistics so callers can report partial failures and cost without
//! re-deriving anything. All types serialise to JSON.

use crate::error::ChunkFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The outcome of transforming one chunk.
///
/// On failure, `output` holds a human-readable placeholder naming the section
/// and the failure, and `error` carries the structured cause — the assembled
/// document stays complete and in order either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResult {
    /// 0-based position in the original text.
    pub index: usize,
    /// Transformed Markdown, or a failure placeholder.
    pub output: String,
    /// Wall-clock time spent on this chunk's model call.
    pub duration_ms: u64,
    /// Set when the chunk's model call failed.
    pub error: Option<ChunkFailure>,
}

impl ChunkResult {
    /// Whether this chunk's transform failed.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Provenance of the draft: where the content came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub filename: String,
    pub file_type: String,
    pub original_size: u64,
    pub processed_at: DateTime<Utc>,
}

/// The document draft produced by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub title: String,
    pub content: String,
    /// Never empty — a default set substitutes when synthesis yields none.
    pub tags: Vec<String>,
    pub summary: String,
    pub source: SourceDocument,
}

/// Which branch the orchestrator took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingRoute {
    /// Content fit under the input budget; one structured call.
    Small,
    /// Content was split and transformed chunk by chunk.
    Chunked,
}

/// Statistics about one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub route: ProcessingRoute,
    /// Heuristic token estimate of the extracted content.
    pub estimated_tokens: usize,
    /// Chunk count on the chunked route; 0 on the small route.
    pub total_chunks: usize,
    pub failed_chunks: usize,
    /// True when metadata synthesis fell back to defaults.
    pub synthesis_fallback: bool,
    /// True when the small path wrapped an unparsable reply.
    pub small_path_fallback: bool,
    pub total_duration_ms: u64,
    /// Time spent inside model calls (including inter-call delays).
    pub model_duration_ms: u64,
}

/// Everything a pipeline run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutput {
    pub draft: DocumentDraft,
    /// Per-chunk results on the chunked route; empty on the small route.
    pub chunks: Vec<ChunkResult>,
    pub stats: ProcessingStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_result_failed_mirrors_error() {
        let ok = ChunkResult {
            index: 0,
            output: "# Fine".into(),
            duration_ms: 3,
            error: None,
        };
        assert!(!ok.failed());

        let bad = ChunkResult {
            index: 1,
            output: "placeholder".into(),
            duration_ms: 3,
            error: Some(ChunkFailure::ModelCall {
                index: 1,
                detail: "boom".into(),
            }),
        };
        assert!(bad.failed());
    }

    #[test]
    fn route_serialises_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProcessingRoute::Small).unwrap(),
            r#""small""#
        );
        assert_eq!(
            serde_json::to_string(&ProcessingRoute::Chunked).unwrap(),
            r#""chunked""#
        );
    }
}
