//! Configuration for document processing.
//!
//! All pipeline behaviour is controlled through [`ProcessingConfig`], built
//! via its [`ProcessingConfigBuilder`]. Keeping every knob in one struct
//! makes it trivial to share configs across requests and to diff two runs to
//! understand why their outputs differ.
//!
//! The completion client and the text extractor are injected here rather than
//! resolved from a process-wide singleton, so tests substitute deterministic
//! doubles and hosts can layer middleware (caching, quota accounting) without
//! touching the pipeline.

use crate::error::PipelineError;
use crate::extract::TextExtractor;
use crate::model::CompletionClient;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for one document-processing pipeline.
///
/// Built via [`ProcessingConfig::builder()`] or
/// [`ProcessingConfig::default()`].
///
/// # Example
/// ```rust
/// use docdraft::ProcessingConfig;
///
/// let config = ProcessingConfig::builder()
///     .max_tokens_per_chunk(2000)
///     .inter_call_delay_ms(500)
///     .model("gpt-4.1-nano")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ProcessingConfig {
    /// Estimated-token budget per chunk. Default: 3000.
    ///
    /// Chunks are closed before they exceed this budget, leaving headroom in
    /// the model context for the system prompt and the bounded output. A
    /// single sentence that alone exceeds the budget is still sent whole —
    /// chunking never truncates content.
    pub max_tokens_per_chunk: usize,

    /// Estimated-token ceiling for the single-call path. Default: 2500.
    ///
    /// Content at or under this estimate is transformed in one structured
    /// call; anything larger goes through the chunked path. 2500 reserves
    /// room for the system prompt and the JSON response inside a typical
    /// context window.
    pub small_doc_budget: usize,

    /// Output-token cap per chunk transform call. Default: 1500.
    pub chunk_output_tokens: usize,

    /// Output-token cap for the single-call path. Default: 4096.
    pub small_output_tokens: usize,

    /// Output-token cap for the metadata-synthesis call. Default: 500.
    ///
    /// Title, tags, and a two-sentence summary fit comfortably; a small cap
    /// keeps a rambling model from padding the metadata call.
    pub synthesis_output_tokens: usize,

    /// How many characters of the assembled document the synthesis call
    /// sees. Default: 2000.
    ///
    /// Metadata needs the gist, not the whole text — the full document was
    /// already paid for once per chunk.
    pub synthesis_prefix_chars: usize,

    /// Fixed delay between consecutive chunk calls, in milliseconds.
    /// Default: 1000.
    ///
    /// Chunk calls share one provider quota with everything else the host
    /// runs; a flat gap between calls keeps a long document from bursting
    /// through the rate limit. No delay is inserted after the last call.
    pub inter_call_delay_ms: u64,

    /// Sampling temperature for all completion calls. Default: 0.3.
    pub temperature: f32,

    /// Model identifier, e.g. "gpt-4.1-nano". If None, uses provider default.
    pub model: Option<String>,

    /// Provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `client`, the provider is auto-detected from the
    /// environment.
    pub provider_name: Option<String>,

    /// Pre-constructed completion client. Takes precedence over
    /// `provider_name`.
    pub client: Option<Arc<dyn CompletionClient>>,

    /// Text extractor collaborator. If None, the built-in plain-text
    /// extractor is used.
    pub extractor: Option<Arc<dyn TextExtractor>>,

    /// Separator between chunk outputs in the assembled document.
    /// Default: horizontal rule.
    pub separator: ChunkSeparator,

    /// Optional per-chunk progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: 3000,
            small_doc_budget: 2500,
            chunk_output_tokens: 1500,
            small_output_tokens: 4096,
            synthesis_output_tokens: 500,
            synthesis_prefix_chars: 2000,
            inter_call_delay_ms: 1000,
            temperature: 0.3,
            model: None,
            provider_name: None,
            client: None,
            extractor: None,
            separator: ChunkSeparator::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ProcessingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingConfig")
            .field("max_tokens_per_chunk", &self.max_tokens_per_chunk)
            .field("small_doc_budget", &self.small_doc_budget)
            .field("chunk_output_tokens", &self.chunk_output_tokens)
            .field("small_output_tokens", &self.small_output_tokens)
            .field("synthesis_output_tokens", &self.synthesis_output_tokens)
            .field("synthesis_prefix_chars", &self.synthesis_prefix_chars)
            .field("inter_call_delay_ms", &self.inter_call_delay_ms)
            .field("temperature", &self.temperature)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("client", &self.client.as_ref().map(|_| "<dyn CompletionClient>"))
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn TextExtractor>"))
            .field("separator", &self.separator)
            .finish()
    }
}

impl ProcessingConfig {
    /// Create a new builder for `ProcessingConfig`.
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ProcessingConfig`].
#[derive(Debug)]
pub struct ProcessingConfigBuilder {
    config: ProcessingConfig,
}

impl ProcessingConfigBuilder {
    pub fn max_tokens_per_chunk(mut self, n: usize) -> Self {
        self.config.max_tokens_per_chunk = n;
        self
    }

    pub fn small_doc_budget(mut self, n: usize) -> Self {
        self.config.small_doc_budget = n;
        self
    }

    pub fn chunk_output_tokens(mut self, n: usize) -> Self {
        self.config.chunk_output_tokens = n;
        self
    }

    pub fn small_output_tokens(mut self, n: usize) -> Self {
        self.config.small_output_tokens = n;
        self
    }

    pub fn synthesis_output_tokens(mut self, n: usize) -> Self {
        self.config.synthesis_output_tokens = n;
        self
    }

    pub fn synthesis_prefix_chars(mut self, n: usize) -> Self {
        self.config.synthesis_prefix_chars = n.max(1);
        self
    }

    pub fn inter_call_delay_ms(mut self, ms: u64) -> Self {
        self.config.inter_call_delay_ms = ms;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn separator(mut self, sep: ChunkSeparator) -> Self {
        self.config.separator = sep;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProcessingConfig, PipelineError> {
        let c = &self.config;
        if c.max_tokens_per_chunk == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_tokens_per_chunk must be ≥ 1".into(),
            ));
        }
        if c.small_doc_budget == 0 {
            return Err(PipelineError::InvalidConfig(
                "small_doc_budget must be ≥ 1".into(),
            ));
        }
        if c.chunk_output_tokens == 0 || c.small_output_tokens == 0 {
            return Err(PipelineError::InvalidConfig(
                "output token caps must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How chunk outputs are joined in the assembled document.
///
/// The separator must stay visually distinct so a reader can tell where one
/// transformed section ends and the next begins — particularly around a
/// failed chunk's placeholder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum ChunkSeparator {
    /// Horizontal rule: `"\n\n---\n\n"`. (default)
    #[default]
    HorizontalRule,
    /// Plain paragraph break: `"\n\n"`.
    Blank,
    /// HTML comment with the 1-based section number.
    Comment,
    /// Custom string inserted between sections.
    Custom(String),
}

impl ChunkSeparator {
    /// Render the separator preceding the given section (1-indexed).
    pub fn render(&self, section: usize) -> String {
        match self {
            ChunkSeparator::HorizontalRule => "\n\n---\n\n".to_string(),
            ChunkSeparator::Blank => "\n\n".to_string(),
            ChunkSeparator::Comment => format!("\n\n<!-- section {} -->\n\n", section),
            ChunkSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budgets_match_documented_values() {
        let c = ProcessingConfig::default();
        assert_eq!(c.max_tokens_per_chunk, 3000);
        assert_eq!(c.small_doc_budget, 2500);
        assert_eq!(c.chunk_output_tokens, 1500);
        assert_eq!(c.inter_call_delay_ms, 1000);
    }

    #[test]
    fn builder_rejects_zero_chunk_budget() {
        let err = ProcessingConfig::builder()
            .max_tokens_per_chunk(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn temperature_is_clamped() {
        let c = ProcessingConfig::builder()
            .temperature(9.0)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn separator_rendering() {
        assert_eq!(ChunkSeparator::HorizontalRule.render(2), "\n\n---\n\n");
        assert_eq!(ChunkSeparator::Blank.render(2), "\n\n");
        assert_eq!(
            ChunkSeparator::Comment.render(3),
            "\n\n<!-- section 3 -->\n\n"
        );
        assert_eq!(
            ChunkSeparator::Custom("* * *".into()).render(4),
            "\n\n* * *\n\n"
        );
    }
}
