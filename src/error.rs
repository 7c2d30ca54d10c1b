//! Error types for the docdraft library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PipelineError`] — **Fatal**: the request cannot produce a draft at all
//!   (missing upload, empty instructions, extraction failure, unconfigured
//!   client). Returned as `Err(PipelineError)` from the top-level `process*`
//!   functions.
//!
//! * [`ChunkFailure`] — **Non-fatal**: a single chunk's model call failed but
//!   the other chunks are fine. Stored inside
//!   [`crate::output::ChunkResult`] so callers can inspect partial success
//!   rather than losing the whole document to one bad call.
//!
//! Per-chunk and metadata-synthesis failures are always tolerated; the kinds
//! below are the ones the caller must be able to tell apart to produce a
//! sensible user-facing message (rate-limit guidance, "document too large"
//! guidance, and so on). Mapping them to HTTP statuses is the caller's job.

use crate::extract::ExtractionError;
use crate::model::ModelError;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docdraft library.
///
/// Chunk-level failures use [`ChunkFailure`] and are stored in
/// [`crate::output::ChunkResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No uploaded file exists at the claimed path.
    #[error("Uploaded file not found: '{path}'\nThe upload must exist on disk before processing starts.")]
    MissingFile { path: PathBuf },

    /// The caller supplied no (or blank) processing instructions.
    #[error("Processing instructions are empty.\nDescribe the transformation to apply, e.g. \"summarize as meeting notes\".")]
    MissingInstructions,

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The extraction collaborator rejected the file.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    // ── Model errors ──────────────────────────────────────────────────────
    /// The provider's quota window is exhausted — caller should back off.
    #[error("Model rate limit exceeded: {detail}\nWait for the quota window to reset before retrying.")]
    RateLimited { detail: String },

    /// The request exceeded the model's context window.
    #[error("Document exceeds the model context window: {detail}")]
    ContextLength { detail: String },

    /// No completion client could be resolved (missing API key etc.).
    #[error("Completion client is not configured.\n{hint}")]
    ClientNotConfigured { hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Any other failure outside the tolerated per-call cases.
    #[error("Document transformation failed: {0}")]
    Transform(String),
}

impl From<ModelError> for PipelineError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::RateLimited { detail } => PipelineError::RateLimited { detail },
            ModelError::ContextLength { detail } => PipelineError::ContextLength { detail },
            ModelError::Transport { detail } | ModelError::Api { detail } => {
                PipelineError::Transform(detail)
            }
        }
    }
}

/// A non-fatal failure for a single chunk.
///
/// Stored alongside the placeholder output in
/// [`crate::output::ChunkResult`] when a chunk's model call fails.
/// The overall pipeline continues with the remaining chunks.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ChunkFailure {
    /// The model call for this chunk returned an error.
    #[error("Chunk {index}: model call failed: {detail}")]
    ModelCall { index: usize, detail: String },
}
