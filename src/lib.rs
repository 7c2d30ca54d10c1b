//! # docdraft
//!
//! Transform uploaded documents into structured Markdown drafts using LLMs.
//!
//! ## Why this crate?
//!
//! A document-ingestion endpoint receives files of wildly different sizes
//! with free-text processing instructions ("summarize as meeting notes",
//! "rewrite as a runbook"). One model call handles a two-paragraph memo; a
//! 200-page export needs splitting, dozens of calls against a shared rate
//! limit, and an answer for the call that fails halfway through. This crate
//! packages that pipeline: extraction, token-budget routing, sentence-aware
//! chunking, sequential transformation with per-chunk failure tolerance, and
//! assembly into a draft with synthesised metadata.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Validate  fail fast on missing file / empty instructions
//!  ├─ 2. Extract   raw text + metadata via the extraction collaborator
//!  ├─ 3. Estimate  ceil(chars/4) token heuristic picks the route
//!  ├─ 4a. Small    one structured JSON call (content fits the budget)
//!  ├─ 4b. Chunked  sentence-aware split ──▶ sequential transform calls
//!  │               ──▶ ordered assembly ──▶ one metadata-synthesis call
//!  └─ 5. Draft     title/content/tags/summary + source provenance
//! ```
//!
//! The temporary uploaded file is released on every exit path. A failed
//! chunk becomes a visible placeholder, never a failed request: partial
//! success is preferred over total failure whenever any chunk succeeded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docdraft::{process_bytes, ProcessingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = ProcessingConfig::default();
//!     let output = process_bytes(
//!         b"Quarterly revenue grew 12%. Churn held steady.",
//!         "q3-notes.txt",
//!         "Summarize as an executive brief",
//!         &config,
//!     )
//!     .await?;
//!     println!("{}", output.draft.content);
//!     eprintln!("route: {:?}, chunks failed: {}",
//!         output.stats.route,
//!         output.stats.failed_chunks);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docdraft` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docdraft = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod estimate;
pub mod extract;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod prompts;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ChunkSeparator, ProcessingConfig, ProcessingConfigBuilder};
pub use error::{ChunkFailure, PipelineError};
pub use estimate::estimate_tokens;
pub use extract::{
    ExtractionError, ExtractionMetadata, PlainTextExtractor, RawExtraction, TextExtractor,
};
pub use model::{CompletionClient, CompletionRequest, ModelError, ProviderCompletionClient};
pub use output::{
    ChunkResult, DocumentDraft, ProcessingOutput, ProcessingRoute, ProcessingStats, SourceDocument,
};
pub use pipeline::chunk::{chunk_text, Chunk};
pub use pipeline::input::TempUpload;
pub use process::{process, process_bytes};
pub use progress::{NoopProgressCallback, ProcessingProgressCallback, ProgressCallback};
pub use stream::{process_stream, process_stream_bytes, ChunkResultStream};
