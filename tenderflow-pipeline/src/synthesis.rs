use std::sync::Arc;

use tenderflow_llm::gateway::ModelGateway;
use tenderflow_llm::types::{ChatMessage, ChatRequest};
use tenderflow_types::QuestionItem;

use crate::error::PipelineError;
use crate::locks::ProjectLocks;
use crate::storage::ProjectStore;

/// Synthesizes a project's question set from the aggregated text of its
/// normalized documents.
pub struct QuestionSynthesizer {
    store: Arc<dyn ProjectStore>,
    gateway: Arc<dyn ModelGateway>,
    locks: ProjectLocks,
}

impl QuestionSynthesizer {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        gateway: Arc<dyn ModelGateway>,
        locks: ProjectLocks,
    ) -> Self {
        Self {
            store,
            gateway,
            locks,
        }
    }

    /// Generate and persist the question set for a project, replacing any
    /// prior set. Missing media or all-blank content yields an empty result
    /// without touching the stored questions.
    pub async fn run(&self, project_id: &str) -> Result<Vec<QuestionItem>, PipelineError> {
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("project {}", project_id)))?;

        let media = self.store.get_media(project_id).await?;
        if media.is_empty() {
            tracing::warn!(project_id, "no media items, skipping question generation");
            return Ok(vec![]);
        }

        let all_text = media
            .iter()
            .map(|m| m.content.as_str())
            .filter(|content| !content.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if all_text.trim().is_empty() {
            tracing::warn!(
                project_id,
                "all media content is empty, skipping question generation"
            );
            return Ok(vec![]);
        }

        tracing::info!(
            project_id,
            media_count = media.len(),
            text_len = all_text.len(),
            "generating questions"
        );

        let response = self
            .gateway
            .complete(ChatRequest::new(vec![
                ChatMessage::system(build_system_prompt(&project.generation_prompt)),
                ChatMessage::user(format!("parsed PDF content: {}", all_text)),
            ]))
            .await?;

        // The model may still answer in prose; anything that is not an array
        // becomes an empty set, never fabricated items. Within an array,
        // malformed elements are dropped one by one so a single bad item
        // does not discard the rest.
        let questions: Vec<QuestionItem> = match response.json {
            Some(serde_json::Value::Array(items)) => {
                let total = items.len();
                let questions: Vec<QuestionItem> = items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect();
                if questions.len() < total {
                    tracing::warn!(
                        project_id,
                        dropped = total - questions.len(),
                        "discarded malformed question items"
                    );
                }
                questions
            }
            _ => vec![],
        };

        tracing::info!(project_id, count = questions.len(), "generated questions");

        let _guard = self.locks.acquire(project_id).await;
        self.store
            .update_project_questions(project_id, questions.clone())
            .await?;

        Ok(questions)
    }
}

fn build_system_prompt(generation_prompt: &str) -> String {
    let format = serde_json::json!([{
        "id": "uuid-v4 (generate a unique UUID)",
        "question": "string",
        "analysis": "(just leave empty for now) string",
    }]);
    format!(
        "{}\n\n. always return parsable JSON in the format of {}, use resources provided in user message to generate questions, only generate questions based on the provided text and do not use any prior knowledge.",
        generation_prompt, format
    )
}
