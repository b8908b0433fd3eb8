use crate::llm::client::{LLMClient, StructuredResponse};
use crate::types::{AppError, Result, ToolCall, ToolDefinition};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCalls, ChatCompletionNamedToolChoice,
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage, ChatCompletionTool,
        ChatCompletionToolChoiceOption, ChatCompletionTools, CreateChatCompletionRequestArgs,
        FunctionName, FunctionObject,
    },
};
use async_trait::async_trait;

pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAIClient {
    pub fn new(api_key: String, api_base: String, model: String, temperature: Option<f32>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model,
            temperature,
        }
    }

    fn to_request_messages(messages: &[(String, String)]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|(role, content)| match role.as_str() {
                "system" => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(content.clone()),
                ),
                "assistant" => ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessage::from(content.clone()),
                ),
                _ => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(
                    content.clone(),
                )),
            })
            .collect()
    }

    /// Converts the wire tool calls into the provider-neutral shape.
    ///
    /// Arguments that are not valid JSON, and custom (non-function) calls,
    /// violate the structured-output contract. They must never degrade into
    /// an empty-but-valid payload, so the violation surfaces as an error
    /// instead of a lossy default.
    fn convert_tool_calls(calls: &[ChatCompletionMessageToolCalls]) -> Result<Vec<ToolCall>> {
        calls
            .iter()
            .map(|call| match call {
                ChatCompletionMessageToolCalls::Function(call) => {
                    let arguments =
                        serde_json::from_str(&call.function.arguments).map_err(|e| {
                            AppError::Extraction(format!(
                                "Malformed arguments for tool '{}': {}",
                                call.function.name, e
                            ))
                        })?;
                    Ok(ToolCall {
                        id: call.id.clone(),
                        name: call.function.name.clone(),
                        arguments,
                    })
                }
                ChatCompletionMessageToolCalls::Custom(call) => Err(AppError::Extraction(format!(
                    "Model emitted custom tool call '{}' instead of a function call",
                    call.custom_tool.name
                ))),
            })
            .collect()
    }

    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let request = builder
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(
                system.to_string(),
            )),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(
                prompt.to_string(),
            )),
        ])
        .await
    }

    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        self.complete(Self::to_request_messages(messages)).await
    }

    async fn generate_structured(
        &self,
        messages: &[(String, String)],
        schema: &ToolDefinition,
    ) -> Result<StructuredResponse> {
        let tool = ChatCompletionTools::Function(ChatCompletionTool {
            function: FunctionObject {
                name: schema.name.clone(),
                description: Some(schema.description.clone()),
                parameters: Some(schema.parameters.clone()),
                strict: None,
            },
        });

        // Force the model to call the schema tool so the result is always
        // machine-parseable arguments, never prose.
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(Self::to_request_messages(messages))
            .tools(vec![tool])
            .tool_choice(ChatCompletionToolChoiceOption::Function(
                ChatCompletionNamedToolChoice {
                    function: FunctionName {
                        name: schema.name.clone(),
                    },
                },
            ));
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let request = builder
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI API error: {}", e)))?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))?;

        let content = choice.message.content.clone().unwrap_or_default();
        let finish_reason = choice
            .finish_reason
            .as_ref()
            .map(|r| format!("{:?}", r))
            .unwrap_or_else(|| "unknown".to_string());

        let tool_calls = match &choice.message.tool_calls {
            Some(calls) => Self::convert_tool_calls(calls)?,
            None => vec![],
        };

        Ok(StructuredResponse {
            content,
            tool_calls,
            finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::types::chat::{
        ChatCompletionMessageCustomToolCall, ChatCompletionMessageToolCall, CustomTool,
        FunctionCall,
    };

    fn function_call(arguments: &str) -> ChatCompletionMessageToolCalls {
        ChatCompletionMessageToolCalls::Function(ChatCompletionMessageToolCall {
            id: "call-1".to_string(),
            function: FunctionCall {
                name: "UserProfile".to_string(),
                arguments: arguments.to_string(),
            },
        })
    }

    #[test]
    fn test_convert_valid_function_call() {
        let calls =
            OpenAIClient::convert_tool_calls(&[function_call(r#"{"user_name": "Sam"}"#)]).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "UserProfile");
        assert_eq!(calls[0].arguments["user_name"], "Sam");
    }

    #[test]
    fn test_malformed_arguments_are_a_contract_violation() {
        // Truncated JSON must surface as an error, never as an empty object
        let err = OpenAIClient::convert_tool_calls(&[function_call(r#"{"user_name": "Sa"#)])
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[test]
    fn test_custom_tool_call_is_a_contract_violation() {
        let call = ChatCompletionMessageToolCalls::Custom(ChatCompletionMessageCustomToolCall {
            id: "call-1".to_string(),
            custom_tool: CustomTool {
                name: "something_else".to_string(),
                input: "text".to_string(),
            },
        });
        let err = OpenAIClient::convert_tool_calls(&[call]).unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
