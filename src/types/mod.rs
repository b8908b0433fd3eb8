use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
    pub user_id: String,
    pub thread_id: String,
}

// ============= Conversation Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a user message timestamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates an assistant message timestamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Wire name of the role, as LLM chat APIs expect it.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

// ============= Profile Types =============

/// Durable snapshot of facts learned about a user.
///
/// Always a partial, best-effort record: a missing field means "not yet
/// known", never "explicitly empty". Extraction stores the user's literal
/// phrasing; it must not infer reasons or motives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    /// The user's preferred name. The one field extraction must always
    /// produce; a payload without it does not conform to the schema.
    pub user_name: String,
    /// Age as stated, exact or approximate ("34", "mid-thirties").
    #[serde(default)]
    pub age: Option<String>,
    /// City/country or general location.
    #[serde(default)]
    pub location: Option<String>,
    /// Interests, verbatim as the user provided them.
    #[serde(default)]
    pub interests: Vec<String>,
    /// Dislikes, verbatim as the user provided them.
    #[serde(default)]
    pub dislikes: Vec<String>,
    /// Any other personal detail that fits no other field.
    #[serde(default)]
    pub additional_notes: Option<String>,
}

// ============= Tool Types =============

/// A function/tool schema handed to an LLM for structured output.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool invocation emitted by an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Extraction contract violation: {0}")]
    Extraction(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Store(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::LLM(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Extraction(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::InvalidInput(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Config(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
