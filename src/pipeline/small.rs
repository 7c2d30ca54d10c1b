//! Single-call path for documents under the input token budget.
//!
//! Small documents skip chunking entirely: one structured call returns the
//! transformed content and its metadata together. The model is asked for
//! strict JSON, and when it answers with free text anyway the raw reply
//! becomes the content with default metadata substituted — a format
//! violation by the model is never the caller's problem. Genuine call
//! failures (rate limit, context length, transport) do propagate; with no
//! other chunks to fall back on there is nothing partial to return.

use crate::config::ProcessingConfig;
use crate::model::{CompletionClient, CompletionRequest, ModelError};
use crate::pipeline::assemble::{default_tags, fallback_title, DEFAULT_SUMMARY};
use crate::pipeline::parse::{parse_reply, ModelReply};
use crate::pipeline::postprocess;
use crate::prompts;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of the single-call path.
#[derive(Debug, Clone)]
pub struct SmallDocOutcome {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub summary: String,
    /// True when the reply was not the expected JSON and the raw text was
    /// wrapped with default metadata.
    pub fell_back: bool,
}

/// Expected shape of the small-document reply.
#[derive(Debug, Deserialize)]
struct SmallDocReply {
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    summary: String,
}

/// Transform a small document in one structured call.
///
/// # Errors
/// Returns `Err(ModelError)` only when the call itself fails; a reply in the
/// wrong format is handled by falling back, never by erroring.
pub async fn process_small(
    client: &Arc<dyn CompletionClient>,
    content: &str,
    instructions: &str,
    filename: &str,
    config: &ProcessingConfig,
) -> Result<SmallDocOutcome, ModelError> {
    let request = CompletionRequest {
        system: prompts::SMALL_SYSTEM_PROMPT.to_string(),
        prompt: prompts::small_document_prompt(content, instructions),
        max_output_tokens: config.small_output_tokens,
        temperature: config.temperature,
    };

    let raw = client.complete(&request).await?;

    Ok(match parse_reply::<SmallDocReply>(&raw) {
        ModelReply::Parsed(reply) => {
            debug!("small-document reply parsed");
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
            SmallDocOutcome {
                title,
                content: postprocess::clean_markdown(&reply.content),
                tags: if tags.is_empty() { default_tags() } else { tags },
                summary: if reply.summary.trim().is_empty() {
                    DEFAULT_SUMMARY.to_string()
                } else {
                    reply.summary.trim().to_string()
                },
                fell_back: false,
            }
        }
        ModelReply::Fallback(text) => {
            warn!("small-document reply was not the expected JSON; wrapping raw text");
            SmallDocOutcome {
                title: fallback_title(filename),
                content: postprocess::clean_markdown(&text),
                tags: default_tags(),
                summary: DEFAULT_SUMMARY.to_string(),
                fell_back: true,
            }
        }
    })
}
