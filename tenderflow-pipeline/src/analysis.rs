use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tenderflow_llm::gateway::ModelGateway;
use tenderflow_llm::types::{ChatMessage, ChatRequest};
use tenderflow_types::QuestionItem;

use crate::error::PipelineError;
use crate::locks::ProjectLocks;
use crate::storage::ProjectStore;

const DEFAULT_ANALYSIS_PROMPT: &str =
    r#"Analyze the user question and return parsable JSON in format {"analysis":"string"}."#;

/// Runs one analysis request per question and merges the results back into
/// the stored question set.
pub struct QuestionAnalyzer {
    store: Arc<dyn ProjectStore>,
    gateway: Arc<dyn ModelGateway>,
    locks: ProjectLocks,
    max_in_flight: usize,
}

impl QuestionAnalyzer {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        gateway: Arc<dyn ModelGateway>,
        locks: ProjectLocks,
        max_in_flight: usize,
    ) -> Self {
        Self {
            store,
            gateway,
            locks,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Analyze every question of a project concurrently and persist the
    /// updated set. A failed job keeps that question's prior analysis; the
    /// operation itself still succeeds.
    pub async fn run(&self, project_id: &str) -> Result<Vec<QuestionItem>, PipelineError> {
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("project {}", project_id)))?;

        if project.questions.is_empty() {
            tracing::info!(project_id, "no questions found to analyze");
            return Ok(vec![]);
        }

        let rules = project.analysis_rules.trim();
        let system_prompt = if rules.is_empty() {
            DEFAULT_ANALYSIS_PROMPT.to_string()
        } else {
            rules.to_string()
        };

        tracing::info!(
            project_id,
            count = project.questions.len(),
            max_in_flight = self.max_in_flight,
            "analyzing questions"
        );

        // Completion order is not guaranteed, so each job carries its
        // original index and results merge positionally. Merging by arrival
        // order would scramble the analyses.
        let jobs = project.questions.iter().enumerate().map(|(index, q)| {
            let request = ChatRequest::new(vec![
                ChatMessage::system(system_prompt.clone()),
                ChatMessage::user(q.question.clone()),
            ]);
            let gateway = self.gateway.clone();
            async move { (index, gateway.complete(request).await) }
        });

        let outcomes: Vec<_> = stream::iter(jobs)
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;

        let mut questions = project.questions.clone();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(response) => {
                    if let Some(analysis) = extract_analysis(response.json.as_ref()) {
                        questions[index].analysis = analysis;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        project_id,
                        question_index = index,
                        error = %e,
                        "analysis job failed, keeping prior analysis"
                    );
                }
            }
        }

        let _guard = self.locks.acquire(project_id).await;
        self.store
            .update_project_questions(project_id, questions.clone())
            .await?;

        Ok(questions)
    }
}

/// Pull a usable analysis string out of the sniffed model output. A bare
/// string is taken as-is; an object contributes its non-empty `analysis`
/// field; anything else keeps the prior analysis.
fn extract_analysis(json: Option<&serde_json::Value>) -> Option<String> {
    match json {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Object(map)) => map
            .get("analysis")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_analysis_from_string() {
        let json = serde_json::Value::String("direct".to_string());
        assert_eq!(extract_analysis(Some(&json)), Some("direct".to_string()));
    }

    #[test]
    fn test_extract_analysis_from_object() {
        let json = serde_json::json!({"analysis": "from object"});
        assert_eq!(
            extract_analysis(Some(&json)),
            Some("from object".to_string())
        );
    }

    #[test]
    fn test_extract_analysis_missing_field_keeps_prior() {
        let json = serde_json::json!({"other": "value"});
        assert_eq!(extract_analysis(Some(&json)), None);
    }

    #[test]
    fn test_extract_analysis_empty_string_field_keeps_prior() {
        let json = serde_json::json!({"analysis": ""});
        assert_eq!(extract_analysis(Some(&json)), None);
    }

    #[test]
    fn test_extract_analysis_absent_json_keeps_prior() {
        assert_eq!(extract_analysis(None), None);
    }
}
