use crate::llm::client::{LLMClient, StructuredResponse};
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
    models::ModelOptions,
};
use uuid::Uuid;

pub struct OllamaClient {
    client: Ollama,
    model: String,
    temperature: Option<f32>,
}

impl OllamaClient {
    pub async fn new(base_url: String, model: String, temperature: Option<f32>) -> Result<Self> {
        let url_parts: Vec<&str> = base_url.split("://").collect();
        let (host, port) = if url_parts.len() == 2 {
            let host_port: Vec<&str> = url_parts[1].split(':').collect();
            let host = host_port[0].to_string();
            let port = if host_port.len() == 2 {
                host_port[1].parse().unwrap_or(11434)
            } else {
                11434
            };
            (host, port)
        } else {
            ("localhost".to_string(), 11434)
        };

        let client = Ollama::new(host, port);

        Ok(Self {
            client,
            model,
            temperature,
        })
    }

    fn to_chat_messages(messages: &[(String, String)]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|(role, content)| match role.as_str() {
                "system" => ChatMessage::system(content.clone()),
                "assistant" => ChatMessage::assistant(content.clone()),
                _ => ChatMessage::user(content.clone()),
            })
            .collect()
    }

    fn request(&self, messages: Vec<ChatMessage>) -> ChatMessageRequest {
        let mut request = ChatMessageRequest::new(self.model.clone(), messages);
        if let Some(temperature) = self.temperature {
            request = request.options(ModelOptions::default().temperature(temperature));
        }
        request
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = self.request(messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(prompt.to_string()),
        ])
        .await
    }

    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        self.complete(Self::to_chat_messages(messages)).await
    }

    async fn generate_structured(
        &self,
        messages: &[(String, String)],
        schema: &ToolDefinition,
    ) -> Result<StructuredResponse> {
        // Ollama has no forced tool choice, so the schema is pushed into the
        // prompt and the raw response is parsed as the call arguments. A
        // non-JSON response surfaces as zero tool calls and the caller's
        // contract validation rejects it.
        let schema_instruction = format!(
            "{}\n\nRespond with ONLY a JSON object conforming to this schema, no prose, \
             no code fences:\n{}",
            schema.description, schema.parameters
        );

        let mut chat_messages = vec![ChatMessage::system(schema_instruction)];
        chat_messages.extend(Self::to_chat_messages(messages));

        let content = self.complete(chat_messages).await?;

        let trimmed = content
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        let tool_calls = match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(arguments) if arguments.is_object() => vec![ToolCall {
                id: Uuid::new_v4().to_string(),
                name: schema.name.clone(),
                arguments,
            }],
            _ => vec![],
        };

        Ok(StructuredResponse {
            content,
            tool_calls,
            finish_reason: "stop".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_configured_temperature_reaches_the_request() {
        let client = OllamaClient::new(
            "http://localhost:11434".to_string(),
            "llama3.2".to_string(),
            Some(0.2),
        )
        .await
        .unwrap();

        let request = client.request(vec![ChatMessage::user("hi".to_string())]);
        assert_eq!(
            request.options,
            Some(ModelOptions::default().temperature(0.2))
        );
    }

    #[tokio::test]
    async fn test_unset_temperature_sends_no_options() {
        let client = OllamaClient::new(
            "http://localhost:11434".to_string(),
            "llama3.2".to_string(),
            None,
        )
        .await
        .unwrap();

        let request = client.request(vec![ChatMessage::user("hi".to_string())]);
        assert!(request.options.is_none());
    }
}
