//! Question synthesis behavior against mocked gateway and storage.

mod common;

use std::sync::Arc;

use common::{sample_media, sample_project, SequenceGateway};
use tenderflow_llm::error::GatewayError;
use tenderflow_pipeline::{
    InMemoryProjectStore, PipelineError, ProjectLocks, ProjectStore, QuestionSynthesizer,
};

fn synthesizer(
    store: &Arc<InMemoryProjectStore>,
    gateway: SequenceGateway,
) -> QuestionSynthesizer {
    QuestionSynthesizer::new(store.clone(), Arc::new(gateway), ProjectLocks::new())
}

#[tokio::test]
async fn test_generated_questions_are_persisted() {
    let store = Arc::new(InMemoryProjectStore::new());
    store.insert_project(sample_project("p-1"));
    store.insert_media(sample_media("m-1", "p-1", "The sky is blue."));

    let gateway = SequenceGateway::repeating(
        r#"[{"id":"1","question":"What color is the sky?","analysis":""}]"#,
    );
    let questions = synthesizer(&store, gateway).run("p-1").await.unwrap();

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].id, "1");
    assert_eq!(questions[0].question, "What color is the sky?");
    assert_eq!(questions[0].analysis, "");

    let project = store.get_project("p-1").await.unwrap().unwrap();
    assert_eq!(project.questions, questions);
}

#[tokio::test]
async fn test_prose_response_yields_empty_set() {
    let store = Arc::new(InMemoryProjectStore::new());
    let mut project = sample_project("p-1");
    project.questions = vec![common::question("old", "Stale question?")];
    store.insert_project(project);
    store.insert_media(sample_media("m-1", "p-1", "Some text."));

    let gateway = SequenceGateway::repeating("I could not produce questions.");
    let questions = synthesizer(&store, gateway).run("p-1").await.unwrap();

    assert!(questions.is_empty());
    // The stored set is fully replaced, not merged with the stale one.
    let project = store.get_project("p-1").await.unwrap().unwrap();
    assert!(project.questions.is_empty());
}

#[tokio::test]
async fn test_malformed_array_element_does_not_discard_the_rest() {
    let store = Arc::new(InMemoryProjectStore::new());
    store.insert_project(sample_project("p-1"));
    store.insert_media(sample_media("m-1", "p-1", "The sky is blue."));

    // The middle element has no question text and cannot be kept.
    let gateway = SequenceGateway::repeating(
        r#"[{"id":"1","question":"What color is the sky?","analysis":""},{"id":"2","analysis":""},{"id":"3","question":"Is it daytime?","analysis":""}]"#,
    );
    let questions = synthesizer(&store, gateway).run("p-1").await.unwrap();

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].question, "What color is the sky?");
    assert_eq!(questions[1].question, "Is it daytime?");

    let project = store.get_project("p-1").await.unwrap().unwrap();
    assert_eq!(project.questions, questions);
}

#[tokio::test]
async fn test_no_media_is_a_non_fatal_empty_result() {
    let store = Arc::new(InMemoryProjectStore::new());
    let mut project = sample_project("p-1");
    project.questions = vec![common::question("old", "Stale question?")];
    store.insert_project(project);

    let gateway = SequenceGateway::new(vec![]);
    let questions = synthesizer(&store, gateway).run("p-1").await.unwrap();

    assert!(questions.is_empty());
    // Without source text nothing is persisted either way.
    let project = store.get_project("p-1").await.unwrap().unwrap();
    assert_eq!(project.questions.len(), 1);
}

#[tokio::test]
async fn test_blank_media_content_is_a_non_fatal_empty_result() {
    let store = Arc::new(InMemoryProjectStore::new());
    store.insert_project(sample_project("p-1"));
    store.insert_media(sample_media("m-1", "p-1", "   \n  "));

    let gateway = SequenceGateway::new(vec![]);
    let questions = synthesizer(&store, gateway).run("p-1").await.unwrap();
    assert!(questions.is_empty());
}

#[tokio::test]
async fn test_gateway_failure_propagates_unchanged() {
    let store = Arc::new(InMemoryProjectStore::new());
    store.insert_project(sample_project("p-1"));
    store.insert_media(sample_media("m-1", "p-1", "Some text."));

    let gateway = SequenceGateway::new(vec![Err(GatewayError::api_error(
        429,
        "Rate limit reached".to_string(),
    ))]);
    let err = synthesizer(&store, gateway).run("p-1").await.unwrap_err();

    match err {
        PipelineError::Gateway(GatewayError::Api { status, message }) => {
            assert_eq!(status, 429);
            assert_eq!(message, "Rate limit reached");
        }
        other => panic!("Expected gateway error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_project_is_not_found() {
    let store = Arc::new(InMemoryProjectStore::new());
    let gateway = SequenceGateway::new(vec![]);
    let err = synthesizer(&store, gateway).run("missing").await.unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));
}
