//! Eager (full-document) processing entry points.
//!
//! This module is the orchestrator: it validates the request, runs the
//! extraction collaborator, estimates the content size, routes to the
//! small-document or chunked path, and attaches source metadata to the
//! finished draft. The [`TempUpload`] guard moves in here and is dropped on
//! every exit path, so the temporary uploaded file is released exactly once
//! no matter where the pipeline stops.
//!
//! ```text
//! Validating → Extracting → Estimating → {SmallPath | ChunkedPath} → Done
//!      └──────────── any failure ────────────▶ Failed (upload released)
//! ```

use crate::config::ProcessingConfig;
use crate::error::PipelineError;
use crate::estimate::estimate_tokens;
use crate::extract::{PlainTextExtractor, TextExtractor};
use crate::model::{self, CompletionClient};
use crate::output::{
    ChunkResult, DocumentDraft, ProcessingOutput, ProcessingRoute, ProcessingStats, SourceDocument,
};
use crate::pipeline::input::TempUpload;
use crate::pipeline::{assemble, chunk, small, transform};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Process an uploaded document into a draft.
///
/// This is the primary entry point for the library. The upload is consumed:
/// its temporary file is deleted before this function returns, on success
/// and on every error path.
///
/// # Errors
/// Returns `Err(PipelineError)` only for fatal failures — missing input,
/// extraction failure, an unconfigured client, or a model failure on the
/// single-call path. Per-chunk and metadata-synthesis failures are tolerated
/// and reported through the returned [`ProcessingOutput`] instead.
pub async fn process(
    upload: TempUpload,
    instructions: impl AsRef<str>,
    config: &ProcessingConfig,
) -> Result<ProcessingOutput, PipelineError> {
    let total_start = Instant::now();
    let instructions = instructions.as_ref();
    info!("Starting document processing: {}", upload.original_name());

    // ── Validate ─────────────────────────────────────────────────────────
    // Fail fast before any collaborator runs; the guard still releases the
    // upload on these returns.
    if instructions.trim().is_empty() {
        return Err(PipelineError::MissingInstructions);
    }
    if !upload.path().exists() {
        return Err(PipelineError::MissingFile {
            path: upload.path().to_path_buf(),
        });
    }

    // ── Resolve collaborators ────────────────────────────────────────────
    let client = model::resolve_client(config)?;
    let extractor = resolve_extractor(config);

    // ── Extract ──────────────────────────────────────────────────────────
    let extraction = extractor
        .extract(upload.path(), upload.original_name())
        .await?;
    let source_meta = extraction.metadata.clone();

    // ── Estimate & route ─────────────────────────────────────────────────
    let estimated_tokens = estimate_tokens(&extraction.content);
    debug!(
        estimated_tokens,
        budget = config.small_doc_budget,
        "estimated content size"
    );

    let model_start = Instant::now();
    let routed = if estimated_tokens <= config.small_doc_budget {
        info!("content fits the single-call budget; taking the small-document path");
        run_small_path(
            &client,
            &extraction.content,
            instructions,
            &source_meta.original_name,
            config,
        )
        .await?
    } else {
        info!(estimated_tokens, "content exceeds the single-call budget; chunking");
        run_chunked_path(
            &client,
            &extraction.content,
            instructions,
            &source_meta.original_name,
            config,
        )
        .await
    };
    let model_duration_ms = model_start.elapsed().as_millis() as u64;

    // ── Assemble the draft ───────────────────────────────────────────────
    let failed_chunks = routed.chunks.iter().filter(|r| r.failed()).count();
    let draft = DocumentDraft {
        title: routed.title,
        content: routed.content,
        tags: routed.tags,
        summary: routed.summary,
        source: SourceDocument {
            filename: source_meta.original_name,
            file_type: source_meta.mime_type,
            original_size: source_meta.size,
            processed_at: Utc::now(),
        },
    };

    let stats = ProcessingStats {
        route: routed.route,
        estimated_tokens,
        total_chunks: routed.chunks.len(),
        failed_chunks,
        synthesis_fallback: routed.synthesis_fallback,
        small_path_fallback: routed.small_path_fallback,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        model_duration_ms,
    };

    info!(
        route = ?stats.route,
        chunks = stats.total_chunks,
        failed = stats.failed_chunks,
        elapsed_ms = stats.total_duration_ms,
        "document processing complete"
    );

    // Release the upload before returning; everything we need is in memory.
    drop(upload);

    Ok(ProcessingOutput {
        draft,
        chunks: routed.chunks,
        stats,
    })
}

/// Process an in-memory upload.
///
/// Spools `bytes` to a managed temp file and runs [`process`]; the file is
/// cleaned up on return like any other upload.
pub async fn process_bytes(
    bytes: &[u8],
    original_name: &str,
    instructions: impl AsRef<str>,
    config: &ProcessingConfig,
) -> Result<ProcessingOutput, PipelineError> {
    let upload = TempUpload::from_bytes(bytes, original_name)
        .map_err(|e| PipelineError::Transform(format!("failed to spool upload: {e}")))?;
    process(upload, instructions, config).await
}

/// The configured extractor, or the built-in plain-text one.
pub(crate) fn resolve_extractor(config: &ProcessingConfig) -> Arc<dyn TextExtractor> {
    match config.extractor {
        Some(ref extractor) => Arc::clone(extractor),
        None => Arc::new(PlainTextExtractor::default()),
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// What a route produced, before source metadata is attached.
struct RoutedOutcome {
    title: String,
    content: String,
    tags: Vec<String>,
    summary: String,
    chunks: Vec<ChunkResult>,
    route: ProcessingRoute,
    synthesis_fallback: bool,
    small_path_fallback: bool,
}

async fn run_small_path(
    client: &Arc<dyn CompletionClient>,
    content: &str,
    instructions: &str,
    filename: &str,
    config: &ProcessingConfig,
) -> Result<RoutedOutcome, PipelineError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_processing_start(1);
    }
    let outcome = small::process_small(client, content, instructions, filename, config).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_processing_complete(1, 1);
    }

    Ok(RoutedOutcome {
        title: outcome.title,
        content: outcome.content,
        tags: outcome.tags,
        summary: outcome.summary,
        chunks: Vec::new(),
        route: ProcessingRoute::Small,
        synthesis_fallback: false,
        small_path_fallback: outcome.fell_back,
    })
}

async fn run_chunked_path(
    client: &Arc<dyn CompletionClient>,
    content: &str,
    instructions: &str,
    filename: &str,
    config: &ProcessingConfig,
) -> RoutedOutcome {
    let pieces = chunk::chunk_text(content, config.max_tokens_per_chunk);
    debug!(chunks = pieces.len(), "content chunked");
    if let Some(ref cb) = config.progress_callback {
        cb.on_processing_start(pieces.len());
    }

    let results = transform::transform_chunks(client, &pieces, instructions, config).await;
    let succeeded = results.iter().filter(|r| !r.failed()).count();
    if let Some(ref cb) = config.progress_callback {
        cb.on_processing_complete(results.len(), succeeded);
    }

    let assembled = assemble::assemble_content(&results, &config.separator);
    let meta =
        assemble::synthesize_metadata(client, filename, instructions, &assembled, config).await;

    RoutedOutcome {
        title: meta.title,
        content: assembled,
        tags: meta.tags,
        summary: meta.summary,
        chunks: results,
        route: ProcessingRoute::Chunked,
        synthesis_fallback: meta.fell_back,
        small_path_fallback: false,
    }
}
