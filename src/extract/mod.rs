//! Structured profile extraction.
//!
//! Distills a conversation into a [`UserProfile`] by forcing the model to
//! emit exactly one structured object conforming to the profile schema.
//! Merge logic lives in the model, not here: when a prior profile exists it
//! is passed back as a seed, and the model returns a full replacement record
//! that incorporates it. The crate persists whatever comes back wholesale.
//!
//! The exactly-one-conforming-result expectation is a hard contract. Zero
//! calls, multiple calls, or a payload that does not deserialize is an
//! [`AppError::Extraction`], and nothing is persisted for that turn.

use crate::llm::LLMClient;
use crate::types::{AppError, Message, Result, ToolDefinition, UserProfile};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Instruction enforcing verbatim capture.
const EXTRACTION_INSTRUCTION: &str = "\
Extract information from the conversation and update the user profile.
IMPORTANT RULES:
1. Store ONLY what the user explicitly said - do NOT infer, assume, or add reasons
2. Keep information as close to the user's original words as possible
3. If the user provides full sentences, store those full sentences
4. If the user gives keywords, store those keywords
5. Do NOT make assumptions about WHY they like/dislike something unless they explicitly told you
6. Preserve the user's original phrasing and intent";

/// Tool name the model must call; doubles as the schema title.
pub const PROFILE_TOOL_NAME: &str = "UserProfile";

/// JSON schema for [`UserProfile`], handed to the model as the one allowed
/// tool. Field descriptions repeat the verbatim-capture rules because models
/// follow per-field guidance more reliably than a single instruction block.
pub fn profile_schema() -> ToolDefinition {
    ToolDefinition {
        name: PROFILE_TOOL_NAME.to_string(),
        description: "Complete profile of a user".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "user_name": {
                    "type": "string",
                    "description": "The user's preferred name"
                },
                "age": {
                    "type": ["string", "null"],
                    "description": "User's age (can be exact or approximate)"
                },
                "location": {
                    "type": ["string", "null"],
                    "description": "User's city/country or general location"
                },
                "interests": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "A list of user's interests - capture as detailed descriptions or full sentences, or single words as provided by the user. Store exactly what the user provides. Do NOT infer reasons or add details."
                },
                "dislikes": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "A list of things the user dislikes - capture as detailed descriptions or full sentences, or single words as provided by the user. Store exactly what the user provides. Do NOT infer reasons or add details."
                },
                "additional_notes": {
                    "type": ["string", "null"],
                    "description": "Any other personal details or information provided by the user. Capture exactly as provided by the user. Do NOT infer reasons or add details."
                }
            },
            "required": ["user_name"]
        }),
    }
}

/// Structured-extraction capability consumed by the memory writer.
///
/// Seed in, full replacement object out: implementations must return a
/// complete profile that already incorporates the seed, because the caller
/// persists the result without any field-level merging.
#[async_trait]
pub trait ProfileExtractor: Send + Sync {
    async fn extract(
        &self,
        history: &[Message],
        seed: Option<&UserProfile>,
    ) -> Result<UserProfile>;
}

/// LLM-backed extractor driving forced tool-calling structured output.
pub struct LlmProfileExtractor {
    llm: Arc<dyn LLMClient>,
}

impl LlmProfileExtractor {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn build_messages(
        history: &[Message],
        seed: Option<&UserProfile>,
    ) -> Result<Vec<(String, String)>> {
        let mut messages = vec![("system".to_string(), EXTRACTION_INSTRUCTION.to_string())];

        if let Some(seed) = seed {
            let seed_json = serde_json::to_string(seed)
                .map_err(|e| AppError::Internal(format!("Failed to serialize seed: {}", e)))?;
            messages.push((
                "system".to_string(),
                format!(
                    "Here is the existing profile. Update it with new information from the \
                     conversation and return the complete updated profile, keeping every \
                     previously captured fact that still holds:\n{}",
                    seed_json
                ),
            ));
        }

        messages.extend(
            history
                .iter()
                .map(|m| (m.role.as_str().to_string(), m.content.clone())),
        );

        Ok(messages)
    }
}

#[async_trait]
impl ProfileExtractor for LlmProfileExtractor {
    async fn extract(
        &self,
        history: &[Message],
        seed: Option<&UserProfile>,
    ) -> Result<UserProfile> {
        let messages = Self::build_messages(history, seed)?;
        let schema = profile_schema();

        let response = self.llm.generate_structured(&messages, &schema).await?;

        if response.tool_calls.len() != 1 {
            return Err(AppError::Extraction(format!(
                "Expected exactly one {} call, got {}",
                PROFILE_TOOL_NAME,
                response.tool_calls.len()
            )));
        }

        let call = &response.tool_calls[0];
        if call.name != PROFILE_TOOL_NAME {
            return Err(AppError::Extraction(format!(
                "Model called '{}' instead of {}",
                call.name, PROFILE_TOOL_NAME
            )));
        }

        serde_json::from_value(call.arguments.clone()).map_err(|e| {
            AppError::Extraction(format!("Non-conforming {} payload: {}", PROFILE_TOOL_NAME, e))
        })
    }
}
