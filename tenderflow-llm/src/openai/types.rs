//! Wire types for the OpenAI chat-completions endpoint.

use serde::{Deserialize, Serialize};

use crate::types::Usage;

/// A message as sent over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

/// Request body for `POST /v1/chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIChatCompletionRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<OpenAIResponseFormat>,
}

/// Response-shape hint as sent over the wire
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response body for `POST /v1/chat/completions`
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChatCompletionResponse {
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Error payload wrapper returned on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIErrorResponse {
    pub error: OpenAIErrorDetail,
}

/// Inner error detail
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIErrorDetail {
    pub message: String,
}
