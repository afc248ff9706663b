use std::sync::Arc;

use tenderflow_llm::gateway::ModelGateway;

use crate::error::PipelineError;
use crate::events::{emit, EventSender, PipelineEvent};
use crate::locks::ProjectLocks;
use crate::normalizer::DocumentNormalizer;
use crate::storage::ProjectStore;
use crate::synthesis::QuestionSynthesizer;

/// Walks a project's media, normalizes each document and caches its text,
/// then triggers question synthesis in the background.
///
/// Media items are processed strictly in sequence: synthesis needs the
/// whole batch anyway, and one normalization call at a time bounds load on
/// the conversion service.
pub struct MediaIngestion {
    store: Arc<dyn ProjectStore>,
    gateway: Arc<dyn ModelGateway>,
    normalizer: Arc<DocumentNormalizer>,
    locks: ProjectLocks,
    events: Option<EventSender>,
    media_base_url: String,
}

impl MediaIngestion {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        gateway: Arc<dyn ModelGateway>,
        normalizer: Arc<DocumentNormalizer>,
        locks: ProjectLocks,
        events: Option<EventSender>,
        media_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            normalizer,
            locks,
            events,
            media_base_url: media_base_url.into(),
        }
    }

    /// Normalize every media item of a project. Individual failures are
    /// logged and skipped; the operation succeeds once the loop completes,
    /// even if every item failed. Callers detect partial failure by
    /// inspecting the persisted `content` fields.
    pub async fn run(&self, project_id: &str) -> Result<(), PipelineError> {
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| PipelineError::not_found(format!("project {}", project_id)))?;

        let media = self.store.get_media(project_id).await?;
        tracing::info!(project_id, name = %project.name, count = media.len(), "ingesting project media");

        for item in &media {
            let fetch_url = item.url.clone().unwrap_or_else(|| {
                format!(
                    "{}/{}",
                    self.media_base_url.trim_end_matches('/'),
                    item.object_key
                )
            });
            tracing::info!(media_id = %item.id, url = %fetch_url, "normalizing media item");

            match self.normalizer.extract_from_url(&fetch_url).await {
                Ok(text) => {
                    if let Err(e) = self.store.update_media_content(&item.id, &text).await {
                        tracing::error!(media_id = %item.id, error = %e, "failed to cache extracted text");
                    } else {
                        tracing::info!(media_id = %item.id, text_len = text.len(), "media item normalized");
                    }
                }
                Err(e) => {
                    tracing::error!(media_id = %item.id, error = %e, "normalization failed, continuing with next item");
                }
            }
        }

        self.spawn_question_synthesis(project_id);
        Ok(())
    }

    /// Kick off question synthesis without gating the ingestion result on
    /// it. The task's outcome is logged and emitted as a pipeline event.
    fn spawn_question_synthesis(&self, project_id: &str) {
        let synthesizer =
            QuestionSynthesizer::new(self.store.clone(), self.gateway.clone(), self.locks.clone());
        let events = self.events.clone();
        let project_id = project_id.to_string();

        tokio::spawn(async move {
            match synthesizer.run(&project_id).await {
                Ok(questions) => {
                    tracing::info!(
                        project_id,
                        count = questions.len(),
                        "background question synthesis completed"
                    );
                    emit(
                        &events,
                        PipelineEvent::QuestionSynthesisCompleted {
                            project_id,
                            question_count: questions.len(),
                        },
                    );
                }
                Err(e) => {
                    tracing::error!(project_id, error = %e, "background question synthesis failed");
                    emit(
                        &events,
                        PipelineEvent::QuestionSynthesisFailed {
                            project_id,
                            message: e.to_string(),
                        },
                    );
                }
            }
        });
    }
}
