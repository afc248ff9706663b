use async_trait::async_trait;
use tenderflow_types::{Media, Project, QuestionItem, Submission};

mod memory;

pub use memory::{InMemoryObjectStore, InMemoryProjectStore};

/// Persistence collaborator for project, media and submission records.
///
/// The pipeline only ever reads and rewrites the fields it owns; it never
/// deletes records. Implementations decide durability.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>, StorageError>;
    /// Media items for a project, in upload order.
    async fn get_media(&self, project_id: &str) -> Result<Vec<Media>, StorageError>;
    async fn update_media_content(&self, media_id: &str, content: &str)
        -> Result<(), StorageError>;
    /// Replace a project's question set wholesale.
    async fn update_project_questions(
        &self,
        project_id: &str,
        questions: Vec<QuestionItem>,
    ) -> Result<(), StorageError>;
    async fn update_project_proposal(
        &self,
        project_id: &str,
        proposal: &str,
    ) -> Result<(), StorageError>;
    /// Create an immutable submission snapshot, returning its id.
    async fn create_submission(&self, submission: Submission) -> Result<String, StorageError>;
    async fn get_submissions(&self, project_id: &str) -> Result<Vec<Submission>, StorageError>;
}

/// Object storage collaborator for uploaded file bytes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under a key, returning the stored key.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for StorageError {
    fn from(err: anyhow::Error) -> Self {
        StorageError::Other(err.to_string())
    }
}
