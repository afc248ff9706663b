use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::{
    error::GatewayError,
    gateway::{sniff_json, GatewayResponse, ModelGateway},
    openai::types::{
        OpenAIChatCompletionRequest, OpenAIChatCompletionResponse, OpenAIErrorResponse,
        OpenAIMessage, OpenAIResponseFormat,
    },
    types::{ChatRequest, ResponseFormat},
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-5";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Gateway backed by the OpenAI chat-completions endpoint.
///
/// Issues exactly one HTTP request per `complete` call; retries, if any, are
/// the caller's responsibility.
pub struct OpenAIGateway {
    api_key: String,
    base_url: String,
    default_model: String,
    http_client: reqwest::Client,
}

impl OpenAIGateway {
    /// Create a new gateway with the given API key. Fails when no credential
    /// is configured.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new gateway with a bounded per-request timeout.
    pub fn with_timeout(
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(GatewayError::configuration("API key is not configured"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network { source: e })?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            http_client,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model used when a request does not name one
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn build_wire_request(&self, request: ChatRequest) -> OpenAIChatCompletionRequest {
        let messages = request
            .messages
            .into_iter()
            .map(|m| OpenAIMessage {
                role: m.role.to_string(),
                content: m.content,
            })
            .collect();

        OpenAIChatCompletionRequest {
            model: request
                .model
                .unwrap_or_else(|| self.default_model.clone()),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.response_format.map(|f| OpenAIResponseFormat {
                format_type: match f {
                    ResponseFormat::Text => "text".to_string(),
                    ResponseFormat::JsonObject => "json_object".to_string(),
                },
            }),
        }
    }
}

#[async_trait]
impl ModelGateway for OpenAIGateway {
    async fn complete(&self, request: ChatRequest) -> Result<GatewayResponse, GatewayError> {
        if request.messages.is_empty() {
            return Err(GatewayError::invalid_input("messages must not be empty"));
        }

        let wire_request = self.build_wire_request(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| GatewayError::configuration("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(model = %wire_request.model, "sending chat completion request");
        let started = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| GatewayError::Network { source: e })?;

        let status = response.status();
        let latency_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            // Prefer the provider's own error message, fall back to the
            // HTTP status text when the body is not a standard error payload.
            let message = match serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                Ok(parsed) => parsed.error.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            };
            return Err(GatewayError::api_error(status.as_u16(), message));
        }

        let completion: OpenAIChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::internal(format!("Failed to parse response: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::internal("No completion choices returned"))?;

        tracing::debug!(latency_ms, model = %completion.model, "chat completion succeeded");

        let json = sniff_json(&choice.message.content);
        Ok(GatewayResponse {
            content: choice.message.content,
            role: choice.message.role,
            finish_reason: choice.finish_reason,
            usage: completion.usage,
            model: completion.model,
            json,
            latency_ms,
        })
    }
}
