//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for interacting with various LLM providers:
//! - **OpenAI**: Chat completion and forced tool-calling structured extraction
//! - **Ollama**: Chat completion, with JSON-mode prompting for extraction

use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code. The turn pipeline
/// uses two capabilities: free-text chat completion and structured output
/// conforming to a single tool schema.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion with a system instruction and a single user prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Generate with full conversation history as (role, content) pairs
    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String>;

    /// Generate a structured result conforming to exactly one tool schema.
    ///
    /// The provider is expected to force the model to invoke `schema` and
    /// surface the call arguments in [`StructuredResponse::tool_calls`].
    /// Callers validate the exactly-one-call contract; providers only
    /// report what the model produced.
    async fn generate_structured(
        &self,
        messages: &[(String, String)],
        schema: &ToolDefinition,
    ) -> Result<StructuredResponse>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Response from a structured generation request
#[derive(Debug, Clone)]
pub struct StructuredResponse {
    /// Free-text content, if the model produced any alongside the call
    pub content: String,
    /// Tool calls emitted by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g., "stop", "tool_calls", "length")
    pub finish_reason: String,
}

/// Provider enum for runtime selection
///
/// # Supported Providers
///
/// | Provider | Chat | Structured extraction | Notes |
/// |----------|------|-----------------------|-------|
/// | OpenAI | ✅ | ✅ forced tool call | Recommended for production |
/// | Ollama | ✅ | ✅ JSON-mode prompt | Recommended for local |
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including Azure OpenAI and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o-mini".to_string(),
    ///     temperature: Some(0.7),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        temperature: Option<f32>,
    },

    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.2".to_string(),
    ///     temperature: None,
    /// };
    /// ```
    Ollama {
        base_url: String,
        model: String,
        temperature: Option<f32>,
    },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the matching Cargo feature is not compiled in
    /// or the provider configuration is invalid.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                temperature,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                *temperature,
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama {
                base_url,
                model,
                temperature,
            } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone(), *temperature)
                    .await?,
            )),

            #[allow(unreachable_patterns)]
            other => Err(AppError::Config(format!(
                "{} provider support was not compiled in. \
                 Enable the matching Cargo feature ('openai' or 'ollama').",
                other.name()
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Model identifier this provider is configured for
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } => model,
            Provider::Ollama { model, .. } => model,
        }
    }
}
