use std::sync::Arc;

use tenderflow_llm::gateway::ModelGateway;
use tenderflow_llm::types::{ChatMessage, ChatRequest};

use crate::error::PipelineError;
use crate::locks::ProjectLocks;
use crate::storage::ProjectStore;

const DEFAULT_PROPOSAL_PROMPT: &str = r#"Based on the project information, generate a proposal draft. Always return parsable JSON in the format {"proposal":"string"}. Use only the provided information and do not use any prior knowledge."#;

/// Synthesizes a proposal draft from a project's question set in a single
/// gateway call.
pub struct ProposalSynthesizer {
    store: Arc<dyn ProjectStore>,
    gateway: Arc<dyn ModelGateway>,
    locks: ProjectLocks,
}

impl ProposalSynthesizer {
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

    /// Generate and persist the proposal text, replacing any prior value.
    /// Nothing is persisted when the gateway call fails.
    pub async fn run(&self, project_id: &str) -> Result<String, PipelineError> {
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("project {}", project_id)))?;

        // Loaded alongside the project for future use; the prompt currently
        // draws on the questions only.
        let _media = self.store.get_media(project_id).await?;
        let _submissions = self.store.get_submissions(project_id).await?;

        let template = project.proposal_template.trim();
        let system_prompt = if template.is_empty() {
            DEFAULT_PROPOSAL_PROMPT.to_string()
        } else {
            template.to_string()
        };

        tracing::info!(project_id, "generating proposal");

        let response = self
            .gateway
            .complete(ChatRequest::new(vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(format!(
                    "Questions: {}",
                    serde_json::to_string(&project.questions)?
                )),
            ]))
            .await?;

        // The full textual completion is stored, not an extracted field;
        // the model often wraps the draft in prose worth keeping.
        let proposal = response.content;

        let _guard = self.locks.acquire(project_id).await;
        self.store
            .update_project_proposal(project_id, &proposal)
            .await?;

        Ok(proposal)
    }
}
