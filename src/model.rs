//! Completion-client seam over the LLM provider stack.
//!
//! The pipeline never talks to a provider SDK directly; every model
//! interaction goes through [`CompletionClient`], a narrow trait that takes a
//! prompt and returns text. Tests substitute a scripted double, and the
//! default implementation wraps whatever `edgequake-llm` provider resolves
//! from configuration or environment.
//!
//! Providers surface failures as display strings only, so
//! [`classify_provider_error`] maps those strings onto the [`ModelError`]
//! kinds the rest of the pipeline branches on. The substring heuristics cover
//! the message shapes of the OpenAI-compatible APIs the factory supports.

use crate::config::ProcessingConfig;
use crate::error::PipelineError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Failure kinds of a single completion call.
#[derive(Debug, Error)]
pub enum ModelError {
    /// HTTP 429 or an equivalent quota message.
    #[error("rate limited: {detail}")]
    RateLimited { detail: String },

    /// The prompt (plus requested output) exceeds the model's context window.
    #[error("context length exceeded: {detail}")]
    ContextLength { detail: String },

    /// Network-level failure: timeout, connection reset, DNS.
    #[error("transport failure: {detail}")]
    Transport { detail: String },

    /// Any other provider error.
    #[error("API error: {detail}")]
    Api { detail: String },
}

/// One bounded completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System message framing the task.
    pub system: String,
    /// User message carrying the content to transform.
    pub prompt: String,
    /// Hard cap on generated tokens.
    pub max_output_tokens: usize,
    /// Sampling temperature.
    pub temperature: f32,
}

/// The external model collaborator.
///
/// Inject a custom implementation via
/// [`crate::config::ProcessingConfigBuilder::client`] — tests use a scripted
/// double, production uses [`ProviderCompletionClient`].
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError>;
}

/// Default [`CompletionClient`] backed by an `edgequake-llm` provider.
pub struct ProviderCompletionClient {
    provider: Arc<dyn LLMProvider>,
}

impl ProviderCompletionClient {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl CompletionClient for ProviderCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let messages = vec![
            ChatMessage::system(request.system.as_str()),
            ChatMessage::user(request.prompt.as_str()),
        ];
        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_output_tokens),
            ..Default::default()
        };

        match self.provider.chat(&messages, Some(&options)).await {
            Ok(response) => {
                debug!(
                    prompt_tokens = response.prompt_tokens,
                    completion_tokens = response.completion_tokens,
                    "completion call succeeded"
                );
                Ok(response.content)
            }
            Err(e) => Err(classify_provider_error(&format!("{e}"))),
        }
    }
}

/// Map a provider error message onto a [`ModelError`] kind.
pub(crate) fn classify_provider_error(detail: &str) -> ModelError {
    let lower = detail.to_lowercase();
    if lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("too many requests")
    {
        ModelError::RateLimited {
            detail: detail.to_string(),
        }
    } else if lower.contains("context length")
        || lower.contains("context_length")
        || lower.contains("maximum context")
        || lower.contains("prompt is too long")
    {
        ModelError::ContextLength {
            detail: detail.to_string(),
        }
    } else if lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("connection")
        || lower.contains("network")
    {
        ModelError::Transport {
            detail: detail.to_string(),
        }
    } else {
        ModelError::Api {
            detail: detail.to_string(),
        }
    }
}

/// Default model when the caller names a provider without a model.
const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Resolve the completion client, from most-specific to least-specific.
///
/// The four-level fallback chain lets library users and CLI users each set
/// exactly as much or as little as they need:
///
/// 1. **Pre-built client** (`config.client`) — the caller constructed the
///    client entirely; we use it as-is. This is how tests inject
///    deterministic doubles.
///
/// 2. **Named provider + model** (`config.provider_name`) — we call
///    [`ProviderFactory::create_llm_provider`] which reads the corresponding
///    API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`) —
///    both set means the execution environment chose; honoured before full
///    auto-detection so the model choice wins even when several API keys are
///    present.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — the factory
///    scans all known API key variables and picks the first available
///    provider.
pub(crate) fn resolve_client(
    config: &ProcessingConfig,
) -> Result<Arc<dyn CompletionClient>, PipelineError> {
    // 1) User-provided client takes priority
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_named_client(name, model);
    }

    // 3) Environment pair
    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_named_client(&prov, &model);
        }
    }

    // 4) Full auto-detection
    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| PipelineError::ClientNotConfigured {
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                 Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                 Error: {e}"
            ),
        })?;

    Ok(Arc::new(ProviderCompletionClient::new(provider)))
}

/// Instantiate a named provider and wrap it as a [`CompletionClient`].
fn create_named_client(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn CompletionClient>, PipelineError> {
    ProviderFactory::create_llm_provider(provider_name, model)
        .map(|p| Arc::new(ProviderCompletionClient::new(p)) as Arc<dyn CompletionClient>)
        .map_err(|e| PipelineError::ClientNotConfigured {
            hint: format!("{e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_rate_limit_messages() {
        assert!(matches!(
            classify_provider_error("HTTP 429 Too Many Requests"),
            ModelError::RateLimited { .. }
        ));
        assert!(matches!(
            classify_provider_error("Rate limit reached for gpt-4.1-nano"),
            ModelError::RateLimited { .. }
        ));
    }

    #[test]
    fn classifies_context_length_messages() {
        assert!(matches!(
            classify_provider_error("This model's maximum context length is 128000 tokens"),
            ModelError::ContextLength { .. }
        ));
        assert!(matches!(
            classify_provider_error("prompt is too long: 210000 tokens"),
            ModelError::ContextLength { .. }
        ));
    }

    #[test]
    fn classifies_transport_messages() {
        assert!(matches!(
            classify_provider_error("request timed out after 60s"),
            ModelError::Transport { .. }
        ));
        assert!(matches!(
            classify_provider_error("connection reset by peer"),
            ModelError::Transport { .. }
        ));
    }

    #[test]
    fn everything_else_is_an_api_error() {
        assert!(matches!(
            classify_provider_error("400 Bad Request: invalid schema"),
            ModelError::Api { .. }
        ));
    }
}
