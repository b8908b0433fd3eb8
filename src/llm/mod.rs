//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for the two model capabilities the
//! turn pipeline consumes: free-text chat completion and structured profile
//! extraction. Provider-specific implementations live behind the [`LLMClient`]
//! trait so the rest of the application can work with any supported LLM.
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `openai` - OpenAI API and compatible endpoints (structured extraction
//!   via forced tool calling)
//! - `ollama` - Local Ollama server (structured extraction via JSON-mode
//!   prompting)
//!
//! # Example
//!
//! ```ignore
//! use mnemo::llm::Provider;
//!
//! let provider = Provider::OpenAI {
//!     api_key: "sk-...".to_string(),
//!     api_base: "https://api.openai.com/v1".to_string(),
//!     model: "gpt-4o-mini".to_string(),
//!     temperature: Some(0.7),
//! };
//! let client = provider.create_client().await?;
//! let reply = client.generate_with_system("Be brief.", "Hello!").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider, StructuredResponse};
