//! Shared domain records for the tenderflow pipeline.
//!
//! These are the shapes the persistence collaborator stores and every
//! pipeline stage reads and rewrites. The pipeline never deletes a project;
//! it only rewrites the fields it owns (`questions`, `proposal_result`,
//! per-media `content`).

use serde::{Deserialize, Serialize};

/// A project groups uploaded documents, the generated question set and the
/// synthesized proposal, plus the free-text instructions that steer each
/// model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Instruction text prepended to the question-synthesis system prompt.
    pub generation_prompt: String,
    /// Rules the model applies when judging respondent answers.
    pub qualification_rules: String,
    /// Rules the model applies when analyzing individual questions.
    pub analysis_rules: String,
    /// System prompt for proposal synthesis; empty means use the default.
    pub proposal_template: String,
    /// Ordered question set. Order is the canonical presentation order for
    /// the questionnaire and must survive every stage unchanged.
    #[serde(default)]
    pub questions: Vec<QuestionItem>,
    /// Raw text of the last synthesized proposal, empty until generated.
    #[serde(default)]
    pub proposal_result: String,
}

/// An uploaded document attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub project_id: String,
    /// Explicit fetch URL; when absent the public object-storage URL derived
    /// from `object_key` is used instead.
    pub url: Option<String>,
    /// Key of the stored file bytes in object storage.
    pub object_key: String,
    pub filename: String,
    pub content_type: String,
    /// Cached extracted text, empty until normalization succeeds.
    #[serde(default)]
    pub content: String,
}

/// One generated question. Ids are stable across analysis-only updates and
/// unique within a single project's question set at any instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
    #[serde(default = "new_id")]
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub analysis: String,
}

/// A question together with the respondent's answer. Lives only inside a
/// questionnaire session until the final snapshot is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub answer: String,
}

impl AnsweredQuestion {
    pub fn from_question(q: &QuestionItem) -> Self {
        Self {
            id: q.id.clone(),
            question: q.question.clone(),
            analysis: q.analysis.clone(),
            answer: String::new(),
        }
    }
}

/// Immutable record of one completed questionnaire session. Created exactly
/// once when a session reaches its finished state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub project_id: String,
    pub contact_id: String,
    pub questions: Vec<AnsweredQuestion>,
}

/// The respondent a questionnaire link was issued to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Generate a fresh v4 uuid string id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
