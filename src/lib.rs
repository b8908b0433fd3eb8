//! # mnemo - Memory-Augmented Conversational Turn Processor
//!
//! A small chatbot core that remembers its users. Each incoming turn is
//! routed to either a welcome greeting or a memory-personalized reply, and
//! after every conversational reply the full history is distilled into a
//! structured per-user profile that seeds future turns.
//!
//! ## Overview
//!
//! mnemo can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `mnemo-server` binary
//! 2. **As a library** - Drive [`turn::TurnProcessor`] from your own code
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use mnemo::extract::LlmProfileExtractor;
//! use mnemo::llm::Provider;
//! use mnemo::store::StoreProvider;
//! use mnemo::turn::TurnProcessor;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Provider::Ollama {
//!         base_url: "http://localhost:11434".to_string(),
//!         model: "llama3.2".to_string(),
//!         temperature: Some(0.7),
//!     };
//!     let llm: Arc<dyn mnemo::llm::LLMClient> = Arc::from(provider.create_client().await?);
//!
//!     let (memory, threads) = StoreProvider::Memory.create_store().await?;
//!     let extractor = Arc::new(LlmProfileExtractor::new(llm.clone()));
//!     let processor = TurnProcessor::new(llm, memory, threads, extractor);
//!
//!     let reply = processor.process_turn("u1", "Hi, I'm Sam!", None).await?;
//!     println!("{}", reply);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` | OpenAI API support (default) |
//! | `ollama` | Ollama local inference (default) |
//! | `turso` | Remote Turso database |
//!
//! ## Modules
//!
//! - [`turn`] - Turn orchestration state machine (the core entry point)
//! - [`extract`] - Structured profile extraction
//! - [`memory`] - Profile records and prompt rendering
//! - [`store`] - Key-value and thread persistence
//! - [`llm`] - LLM client implementations
//! - [`api`] - REST API handlers and routes
//! - [`types`] - Common types and error handling

/// HTTP API handlers and routes.
pub mod api;
/// Structured profile extraction from conversations.
pub mod extract;
/// LLM provider clients and abstractions.
pub mod llm;
/// Long-term user memory records and rendering.
pub mod memory;
/// Persistence backends (in-process, libsql).
pub mod store;
/// Turn orchestration state machine.
pub mod turn;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use extract::{LlmProfileExtractor, ProfileExtractor};
pub use llm::{LLMClient, Provider};
pub use store::{KvStore, StoreProvider, ThreadStore};
pub use turn::TurnProcessor;
pub use types::{AppError, Result, UserProfile};
pub use utils::config::Config;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Environment-driven configuration
    pub config: Arc<Config>,
    /// The turn processor, built once at startup
    pub processor: Arc<TurnProcessor>,
    /// Memory store handle for profile inspection endpoints
    pub memory: Arc<dyn KvStore>,
}
