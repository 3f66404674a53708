//! Model client trait and the OpenAI-compatible implementation.

pub mod http;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::ChickConfig;
use crate::error::ChickError;
use crate::types::{ChatTurn, FinishReason, GenerationSettings, TextStreamDelta, Usage};

/// A request sent to a model client.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
    pub settings: GenerationSettings,
}

/// Response from a model client.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl ChatResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
            finish_reason: Some(FinishReason::Stop),
        }
    }
}

/// The text-completion collaborator the agent talks to.
///
/// Failures propagate to the caller unretried.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Provider name (e.g., "deepseek").
    fn provider_name(&self) -> &str;

    /// The model ID this client serves.
    fn model_id(&self) -> &str;

    /// Generate a completion (non-streaming).
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChickError>;

    /// Generate a completion as a finite stream of text deltas.
    async fn stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, ChickError>>, ChickError>;
}

/// Create the client for the configured provider and model.
pub fn create_client(config: &ChickConfig) -> Result<Arc<dyn ModelClient>, ChickError> {
    let model = config.language_model();
    let provider = model.provider;

    let api_key = config.api_key.clone();
    if api_key.is_none() && provider.requires_api_key() {
        return Err(ChickError::Authentication(format!(
            "Missing {}",
            provider.api_key_env()
        )));
    }

    let base_url = config
        .base_url
        .clone()
        .or_else(|| provider.default_base_url().map(str::to_string))
        .ok_or_else(|| ChickError::Configuration("Missing CHICK_BASE_URL".into()))?;

    Ok(Arc::new(openai::OpenAiCompatibleClient::new(
        model, api_key, base_url,
    )))
}
