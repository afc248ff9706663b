//! # Tenderflow pipeline
//!
//! Multi-stage AI orchestration over a project's uploaded documents:
//! normalize documents to text, synthesize a question set, analyze the
//! questions, gate a respondent through a qualification questionnaire, and
//! synthesize a proposal. Every stage is an independently triggerable async
//! operation coordinating external services (document conversion, text
//! extraction, a generative model behind [`tenderflow_llm::gateway::ModelGateway`])
//! and a persistence collaborator behind [`storage::ProjectStore`].
//!
//! Stages share nothing in-process except persisted state; per-project
//! writes are serialized through [`locks::ProjectLocks`], and fire-and-forget
//! work reports its outcome on the [`events`] channel.

pub mod analysis;
pub mod config;
pub mod error;
pub mod events;
pub mod ingest;
pub mod locks;
pub mod normalizer;
pub mod proposal;
pub mod qualify;
pub mod storage;
pub mod synthesis;

pub use analysis::QuestionAnalyzer;
pub use config::{OpenAIConfig, PipelineConfig, StirlingConfig};
pub use error::PipelineError;
pub use events::{event_channel, EventReceiver, EventSender, PipelineEvent};
pub use ingest::MediaIngestion;
pub use locks::ProjectLocks;
pub use normalizer::{DocumentNormalizer, FilePayload};
pub use proposal::ProposalSynthesizer;
pub use qualify::{QuestionnaireSession, SessionState};
pub use storage::{
    InMemoryObjectStore, InMemoryProjectStore, ObjectStore, ProjectStore, StorageError,
};
pub use synthesis::QuestionSynthesizer;
