use crate::storage::{ObjectStore, ProjectStore, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tenderflow_types::{Media, Project, QuestionItem, Submission};

/// In-memory persistence collaborator, used by tests and the demo runner.
#[derive(Clone, Default)]
pub struct InMemoryProjectStore {
    projects: Arc<Mutex<HashMap<String, Project>>>,
    media: Arc<Mutex<Vec<Media>>>,
    submissions: Arc<Mutex<HashMap<String, Submission>>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_project(&self, project: Project) {
        self.projects
            .lock()
            .unwrap()
            .insert(project.id.clone(), project);
    }

    pub fn insert_media(&self, media: Media) {
        self.media.lock().unwrap().push(media);
    }
}

#[async_trait::async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>, StorageError> {
        Ok(self.projects.lock().unwrap().get(project_id).cloned())
    }

    async fn get_media(&self, project_id: &str) -> Result<Vec<Media>, StorageError> {
        Ok(self
            .media
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn update_media_content(
        &self,
        media_id: &str,
        content: &str,
    ) -> Result<(), StorageError> {
        let mut media = self.media.lock().unwrap();
        match media.iter_mut().find(|m| m.id == media_id) {
            Some(item) => {
                item.content = content.to_string();
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("media {}", media_id))),
        }
    }

    async fn update_project_questions(
        &self,
        project_id: &str,
        questions: Vec<QuestionItem>,
    ) -> Result<(), StorageError> {
        let mut projects = self.projects.lock().unwrap();
        match projects.get_mut(project_id) {
            Some(project) => {
                project.questions = questions;
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("project {}", project_id))),
        }
    }

    async fn update_project_proposal(
        &self,
        project_id: &str,
        proposal: &str,
    ) -> Result<(), StorageError> {
        let mut projects = self.projects.lock().unwrap();
        match projects.get_mut(project_id) {
            Some(project) => {
                project.proposal_result = proposal.to_string();
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("project {}", project_id))),
        }
    }

    async fn create_submission(&self, submission: Submission) -> Result<String, StorageError> {
        let submission_id = submission.id.clone();
        self.submissions
            .lock()
            .unwrap()
            .insert(submission_id.clone(), submission);
        Ok(submission_id)
    }

    async fn get_submissions(&self, project_id: &str) -> Result<Vec<Submission>, StorageError> {
        Ok(self
            .submissions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect())
    }
}

/// In-memory object storage, used by tests and the demo runner.
#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    objects: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.clone()))
    }
}
