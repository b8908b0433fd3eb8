use crate::llm::Provider;
use crate::types::{AppError, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    /// "openai" or "ollama"
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub ollama_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .map_err(|e| AppError::Config(format!("Invalid PORT: {}", e)))?,
            },
            llm: LLMConfig {
                provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                temperature: env::var("LLM_TEMPERATURE")
                    .unwrap_or_else(|_| "0.7".to_string())
                    .parse()
                    .map_err(|e| AppError::Config(format!("Invalid LLM_TEMPERATURE: {}", e)))?,
                openai_api_key: env::var("OPENAI_API_KEY").ok(),
                openai_api_base: env::var("OPENAI_API_BASE")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                ollama_url: env::var("OLLAMA_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            },
        })
    }

    /// Maps the LLM section onto a concrete provider selection.
    pub fn llm_provider(&self) -> Result<Provider> {
        match self.llm.provider.as_str() {
            "openai" => Ok(Provider::OpenAI {
                api_key: self.llm.openai_api_key.clone().ok_or_else(|| {
                    AppError::Config("OPENAI_API_KEY is required for the openai provider".into())
                })?,
                api_base: self.llm.openai_api_base.clone(),
                model: self.llm.model.clone(),
                temperature: Some(self.llm.temperature),
            }),
            "ollama" => Ok(Provider::Ollama {
                base_url: self.llm.ollama_url.clone(),
                model: self.llm.model.clone(),
                temperature: Some(self.llm.temperature),
            }),
            other => Err(AppError::Config(format!(
                "Unknown LLM_PROVIDER '{}' (expected 'openai' or 'ollama')",
                other
            ))),
        }
    }
}
