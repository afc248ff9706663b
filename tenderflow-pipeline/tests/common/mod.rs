//! Shared fixtures for pipeline integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tenderflow_llm::error::GatewayError;
use tenderflow_llm::gateway::{sniff_json, GatewayResponse, ModelGateway};
use tenderflow_llm::types::ChatRequest;
use tenderflow_types::{Media, Project, QuestionItem};

/// Build a gateway response envelope around canned content.
pub fn canned_response(content: &str) -> GatewayResponse {
    GatewayResponse {
        content: content.to_string(),
        role: "assistant".to_string(),
        finish_reason: Some("stop".to_string()),
        usage: None,
        model: "mock-model".to_string(),
        json: sniff_json(content),
        latency_ms: 0,
    }
}

/// Gateway that replays a scripted sequence of outcomes, one per call, then
/// falls back to a repeated response when one is configured.
pub struct SequenceGateway {
    outcomes: Mutex<VecDeque<Result<GatewayResponse, GatewayError>>>,
    fallback: Option<String>,
    calls: AtomicUsize,
}

impl SequenceGateway {
    pub fn new(outcomes: Vec<Result<GatewayResponse, GatewayError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Gateway whose every call returns the same content.
    pub fn repeating(content: &str) -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            fallback: Some(content.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelGateway for SequenceGateway {
    async fn complete(&self, _request: ChatRequest) -> Result<GatewayResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.outcomes.lock().unwrap().pop_front();
        match next {
            Some(outcome) => outcome,
            None => match &self.fallback {
                Some(content) => Ok(canned_response(content)),
                None => Err(GatewayError::internal("sequence gateway exhausted")),
            },
        }
    }
}

/// Gateway that answers based on the user message, with an optional delay
/// per key so tests can force out-of-order completion.
pub struct KeyedGateway {
    rules: Vec<(String, Duration, Result<GatewayResponse, GatewayError>)>,
}

impl KeyedGateway {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Answer `content` after `delay` whenever the user message contains
    /// `key`.
    pub fn respond(mut self, key: &str, delay: Duration, content: &str) -> Self {
        self.rules
            .push((key.to_string(), delay, Ok(canned_response(content))));
        self
    }

    /// Fail whenever the user message contains `key`.
    pub fn fail(mut self, key: &str) -> Self {
        self.rules.push((
            key.to_string(),
            Duration::ZERO,
            Err(GatewayError::api_error(500, "mock failure".to_string())),
        ));
        self
    }
}

#[async_trait]
impl ModelGateway for KeyedGateway {
    async fn complete(&self, request: ChatRequest) -> Result<GatewayResponse, GatewayError> {
        let user_content = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        for (key, delay, outcome) in &self.rules {
            if user_content.contains(key) {
                tokio::time::sleep(*delay).await;
                return match outcome {
                    Ok(response) => Ok(response.clone()),
                    Err(GatewayError::Api { status, message }) => {
                        Err(GatewayError::api_error(*status, message.clone()))
                    }
                    Err(_) => Err(GatewayError::internal("mock failure")),
                };
            }
        }
        Err(GatewayError::internal(format!(
            "no rule matched user message: {}",
            user_content
        )))
    }
}

pub fn sample_project(id: &str) -> Project {
    Project {
        id: id.to_string(),
        name: "Harbor expansion tender".to_string(),
        generation_prompt: "Generate questions".to_string(),
        qualification_rules: "Reject any answer shorter than 5 characters.".to_string(),
        analysis_rules: String::new(),
        proposal_template: String::new(),
        questions: vec![],
        proposal_result: String::new(),
    }
}

pub fn sample_media(id: &str, project_id: &str, content: &str) -> Media {
    Media {
        id: id.to_string(),
        project_id: project_id.to_string(),
        url: None,
        object_key: format!("docs/{}.pdf", id),
        filename: format!("{}.pdf", id),
        content_type: "application/pdf".to_string(),
        content: content.to_string(),
    }
}

pub fn question(id: &str, text: &str) -> QuestionItem {
    QuestionItem {
        id: id.to_string(),
        question: text.to_string(),
        analysis: String::new(),
    }
}
