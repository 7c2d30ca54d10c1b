//! Text extraction: the collaborator that turns an uploaded file into raw text.
//!
//! Binary-format parsing (PDF, spreadsheets, …) lives outside this crate —
//! callers with such needs inject their own [`TextExtractor`]. The built-in
//! [`PlainTextExtractor`] covers the text-based formats an upload endpoint
//! commonly receives and enforces a size ceiling so one oversized upload
//! cannot exhaust memory.
//!
//! File-type detection keys on the *original* filename, not the temp-file
//! path: uploads land on disk under generated names with meaningless
//! extensions, while the name the user gave the file is the one that carries
//! the format information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors produced by a [`TextExtractor`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file's format is not handled by this extractor.
    #[error("Unsupported file format '.{extension}'\nPlain-text formats are handled natively; inject a custom TextExtractor for binary formats.")]
    UnsupportedFormat { extension: String },

    /// The file exceeds the extractor's size ceiling.
    #[error("File is too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// The file could not be read as text (missing, permission, not UTF-8).
    #[error("Failed to read '{path}': {detail}")]
    Unreadable { path: PathBuf, detail: String },

    /// The file was read but contained no usable text.
    #[error("Extracted content is empty: '{path}'")]
    EmptyContent { path: PathBuf },
}

/// Descriptive metadata captured at extraction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub original_name: String,
    pub extension: String,
    pub mime_type: String,
    pub size: u64,
    pub extracted_at: DateTime<Utc>,
    pub content_length: usize,
}

/// The immutable input to the pipeline: raw text plus its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExtraction {
    pub content: String,
    pub metadata: ExtractionMetadata,
}

/// Extraction collaborator seam.
///
/// Implementations must be `Send + Sync`; the pipeline holds them behind an
/// `Arc<dyn TextExtractor>` injected via
/// [`crate::config::ProcessingConfigBuilder::extractor`].
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract raw text from the file at `path`.
    ///
    /// `original_name` is the filename the user uploaded, used for format
    /// detection and recorded in the metadata.
    async fn extract(
        &self,
        path: &Path,
        original_name: &str,
    ) -> Result<RawExtraction, ExtractionError>;
}

/// Built-in extractor for text-based formats.
pub struct PlainTextExtractor {
    max_bytes: u64,
}

impl PlainTextExtractor {
    /// Default size ceiling: 10 MiB of raw text.
    pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_BYTES)
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(
        &self,
        path: &Path,
        original_name: &str,
    ) -> Result<RawExtraction, ExtractionError> {
        let extension = extension_of(original_name);
        if !is_text_extension(&extension) {
            return Err(ExtractionError::UnsupportedFormat { extension });
        }

        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| ExtractionError::Unreadable {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        if meta.len() > self.max_bytes {
            return Err(ExtractionError::TooLarge {
                size: meta.len(),
                limit: self.max_bytes,
            });
        }

        // read_to_string rejects invalid UTF-8, which doubles as the
        // corruption check for text formats.
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ExtractionError::Unreadable {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;

        if content.trim().is_empty() {
            return Err(ExtractionError::EmptyContent {
                path: path.to_path_buf(),
            });
        }

        debug!(
            name = original_name,
            bytes = meta.len(),
            "extracted plain text"
        );

        let content_length = content.chars().count();
        Ok(RawExtraction {
            metadata: ExtractionMetadata {
                original_name: original_name.to_string(),
                mime_type: mime_type_for(&extension).to_string(),
                extension,
                size: meta.len(),
                extracted_at: Utc::now(),
                content_length,
            },
            content,
        })
    }
}

/// Lower-cased extension of a filename, or "" when there is none.
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

fn is_text_extension(ext: &str) -> bool {
    matches!(
        ext,
        "txt" | "text" | "md" | "markdown" | "csv" | "tsv" | "json" | "log" | "html" | "htm"
            | "xml" | "yaml" | "yml" | "toml" | "rst"
    )
}

fn mime_type_for(ext: &str) -> &'static str {
    match ext {
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        _ => "text/plain",
    }
}
