use async_trait::async_trait;

use crate::{
    error::GatewayError,
    types::{ChatRequest, Usage},
};

/// Normalized response envelope returned by every gateway implementation.
///
/// `json` is populated opportunistically: when the completion text, trimmed,
/// begins with `{` or `[` and parses as JSON. The model is free to return
/// prose when no structural contract was requested, so a missing `json` is
/// not an error and every consumer must fall back to defaults.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    /// Raw text of the first completion
    pub content: String,
    /// Role the provider attributed the completion to
    pub role: String,
    /// Finish reason of the first completion, when reported
    pub finish_reason: Option<String>,
    /// Token usage accounting, when reported
    pub usage: Option<Usage>,
    /// Model the provider actually served
    pub model: String,
    /// Best-effort structured parse of `content`
    pub json: Option<serde_json::Value>,
    /// Wall-clock latency of the provider call
    pub latency_ms: u64,
}

/// Attempt to parse model output as JSON, returning `None` on anything that
/// does not look like (or fails to parse as) a JSON object or array.
pub fn sniff_json(content: &str) -> Option<serde_json::Value> {
    let trimmed = content.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed).ok()
    } else {
        None
    }
}

/// Core trait for model gateways. The single chokepoint every pipeline stage
/// goes through to reach the generative model; mock implementations stand in
/// for the provider in tests.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Complete a chat-style request
    async fn complete(&self, request: ChatRequest) -> Result<GatewayResponse, GatewayError>;
}
