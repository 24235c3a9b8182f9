use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use shelfwise_core::config::{LlmConfig, ReasoningVendor};
use shelfwise_core::domain::reasoning::ReasoningOutput;
use shelfwise_core::grounding::context::ReasoningContext;

use crate::adapters::{AnthropicProvider, GeminiProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("provider returned no usable text")]
    EmptyResponse,
    #[error("no JSON object found in provider output")]
    MissingPayload,
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("provider is not configured: {0}")]
    NotConfigured(String),
}

/// Pluggable reasoning capability. Implementations are interchangeable and
/// untrusted: callers must validate every returned payload, and must map any
/// error to a safe fallback rather than surfacing it.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate(&self, context: &ReasoningContext)
        -> Result<ReasoningOutput, ProviderError>;
}

/// Constructs the configured vendor adapter once. The result is injected
/// where needed; nothing in this crate caches a global instance.
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn ReasoningProvider>, ProviderError> {
    match config.provider {
        ReasoningVendor::Anthropic => Ok(Arc::new(AnthropicProvider::from_config(config)?)),
        ReasoningVendor::Gemini => Ok(Arc::new(GeminiProvider::from_config(config)?)),
    }
}
