//! Streaming variant: yield chunk results as they complete.
//!
//! Long documents take minutes at one sequential model call per chunk plus
//! the inter-call delay. The streaming API lets callers display sections as
//! they finish or write them to storage incrementally instead of waiting for
//! the whole run. Results arrive strictly in index order — the transform is
//! sequential by design — and failed chunks arrive as placeholders exactly
//! like the eager path.
//!
//! The stream carries transformed content only; metadata synthesis belongs
//! to the eager [`crate::process::process`] path. Content under the small
//! budget streams as a single chunk.

use crate::config::ProcessingConfig;
use crate::error::PipelineError;
use crate::model;
use crate::output::ChunkResult;
use crate::pipeline::chunk;
use crate::pipeline::input::TempUpload;
use crate::pipeline::transform;
use crate::process::resolve_extractor;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of chunk results, in index order.
pub type ChunkResultStream = Pin<Box<dyn Stream<Item = ChunkResult> + Send>>;

/// Process an uploaded document, streaming each chunk's result as it is
/// transformed.
///
/// Validation and extraction happen eagerly; the temporary uploaded file is
/// released before this function returns, since the extracted content is
/// fully in memory by then. Fatal errors surface here — once the stream
/// exists, per-chunk failures are embedded in the yielded items.
pub async fn process_stream(
    upload: TempUpload,
    instructions: impl AsRef<str>,
    config: &ProcessingConfig,
) -> Result<ChunkResultStream, PipelineError> {
    let instructions = instructions.as_ref().to_string();
    info!(
        "Starting streaming processing: {}",
        upload.original_name()
    );

    if instructions.trim().is_empty() {
        return Err(PipelineError::MissingInstructions);
    }
    if !upload.path().exists() {
        return Err(PipelineError::MissingFile {
            path: upload.path().to_path_buf(),
        });
    }

    let client = model::resolve_client(config)?;
    let extractor = resolve_extractor(config);

    let extraction = extractor
        .extract(upload.path(), upload.original_name())
        .await?;
    // Content is in memory; the upload has served its purpose.
    drop(upload);

    let pieces = chunk::chunk_text(&extraction.content, config.max_tokens_per_chunk);
    let total = pieces.len();
    let config = config.clone();

    let s = stream::iter(pieces.into_iter()).then(move |piece| {
        let client = Arc::clone(&client);
        let instructions = instructions.clone();
        let config = config.clone();
        async move {
            if piece.index > 0 && config.inter_call_delay_ms > 0 {
                sleep(Duration::from_millis(config.inter_call_delay_ms)).await;
            }
            transform::transform_single(&client, &piece, total, &instructions, &config).await
        }
    });

    Ok(Box::pin(s))
}

/// Streaming equivalent of [`crate::process::process_bytes`].
pub async fn process_stream_bytes(
    bytes: &[u8],
    original_name: &str,
    instructions: impl AsRef<str>,
    config: &ProcessingConfig,
) -> Result<ChunkResultStream, PipelineError> {
    let upload = TempUpload::from_bytes(bytes, original_name)
        .map_err(|e| PipelineError::Transform(format!("failed to spool upload: {e}")))?;
    process_stream(upload, instructions, config).await
}
