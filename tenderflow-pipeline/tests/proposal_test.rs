//! Proposal synthesis behavior against mocked gateway and storage.

mod common;

use std::sync::Arc;

use common::{question, sample_project, SequenceGateway};
use tenderflow_llm::error::GatewayError;
use tenderflow_pipeline::{
    InMemoryProjectStore, PipelineError, ProjectLocks, ProjectStore, ProposalSynthesizer,
};

fn synthesizer(
    store: &Arc<InMemoryProjectStore>,
    gateway: SequenceGateway,
) -> ProposalSynthesizer {
    ProposalSynthesizer::new(store.clone(), Arc::new(gateway), ProjectLocks::new())
}

#[tokio::test]
async fn test_full_completion_text_is_stored() {
    let store = Arc::new(InMemoryProjectStore::new());
    let mut project = sample_project("p-1");
    project.questions = vec![question("q0", "What is the deadline?")];
    store.insert_project(project);

    // Even JSON-shaped output is kept verbatim, not unwrapped.
    let content = r#"{"proposal":"We propose a phased delivery."}"#;
    let gateway = SequenceGateway::repeating(content);

    let proposal = synthesizer(&store, gateway).run("p-1").await.unwrap();
    assert_eq!(proposal, content);

    let project = store.get_project("p-1").await.unwrap().unwrap();
    assert_eq!(project.proposal_result, content);
}

#[tokio::test]
async fn test_prior_proposal_is_replaced() {
    let store = Arc::new(InMemoryProjectStore::new());
    let mut project = sample_project("p-1");
    project.proposal_result = "an older draft".to_string();
    store.insert_project(project);

    let gateway = SequenceGateway::repeating("a fresh draft");
    let proposal = synthesizer(&store, gateway).run("p-1").await.unwrap();
    assert_eq!(proposal, "a fresh draft");

    let project = store.get_project("p-1").await.unwrap().unwrap();
    assert_eq!(project.proposal_result, "a fresh draft");
}

#[tokio::test]
async fn test_gateway_failure_persists_nothing() {
    let store = Arc::new(InMemoryProjectStore::new());
    let mut project = sample_project("p-1");
    project.proposal_result = "an older draft".to_string();
    store.insert_project(project);

    let gateway = SequenceGateway::new(vec![Err(GatewayError::api_error(
        500,
        "provider down".to_string(),
    ))]);
    let err = synthesizer(&store, gateway).run("p-1").await.unwrap_err();
    assert!(matches!(err, PipelineError::Gateway(_)));

    let project = store.get_project("p-1").await.unwrap().unwrap();
    assert_eq!(project.proposal_result, "an older draft");
}

#[tokio::test]
async fn test_missing_project_is_not_found() {
    let store = Arc::new(InMemoryProjectStore::new());
    let gateway = SequenceGateway::new(vec![]);
    let err = synthesizer(&store, gateway).run("missing").await.unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));
}
