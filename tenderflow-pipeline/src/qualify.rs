use std::sync::Arc;

use tenderflow_llm::gateway::ModelGateway;
use tenderflow_llm::types::{ChatMessage, ChatRequest};
use tenderflow_types::{new_id, AnsweredQuestion, Contact, Project, Submission};

use crate::events::{emit, EventSender, PipelineEvent};
use crate::storage::ProjectStore;

/// Upper bound on questions presented in one session.
pub const MAX_SESSION_QUESTIONS: usize = 25;

const DEFAULT_REJECTION_MESSAGE: &str = "Answer not qualified";

/// State of a questionnaire session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Project has no questions; nothing to do.
    Empty,
    /// Waiting for the respondent's answer to question `i`.
    Presenting(usize),
    /// A qualification call is in flight for question `i`.
    Validating(usize),
    /// The qualification call itself failed (transport or provider error).
    /// The respondent stays on the question and may retry.
    Blocked { index: usize, message: String },
    /// The model judged the answer not qualified.
    Error { index: usize, message: String },
    /// All questions answered and qualified; the submission snapshot has
    /// been handed off.
    Finished,
}

/// Drives one respondent sequentially through a project's question set.
///
/// Each answer must pass a model-judged qualification check before the
/// session advances. The session is transient: nothing is persisted until
/// the final submission snapshot.
pub struct QuestionnaireSession {
    project_id: String,
    qualification_rules: String,
    contact: Contact,
    questions: Vec<AnsweredQuestion>,
    state: SessionState,
    gateway: Arc<dyn ModelGateway>,
    store: Arc<dyn ProjectStore>,
    events: Option<EventSender>,
    submitted: bool,
}

impl QuestionnaireSession {
    pub fn new(
        project: &Project,
        contact: Contact,
        gateway: Arc<dyn ModelGateway>,
        store: Arc<dyn ProjectStore>,
        events: Option<EventSender>,
    ) -> Self {
        let questions: Vec<AnsweredQuestion> = project
            .questions
            .iter()
            .take(MAX_SESSION_QUESTIONS)
            .map(AnsweredQuestion::from_question)
            .collect();

        let state = if questions.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Presenting(0)
        };

        Self {
            project_id: project.id.clone(),
            qualification_rules: project.qualification_rules.clone(),
            contact,
            questions,
            state,
            gateway,
            store,
            events,
            submitted: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Index of the question the session currently sits on, if any.
    pub fn active_index(&self) -> Option<usize> {
        match self.state {
            SessionState::Presenting(i)
            | SessionState::Validating(i)
            | SessionState::Blocked { index: i, .. }
            | SessionState::Error { index: i, .. } => Some(i),
            SessionState::Empty | SessionState::Finished => None,
        }
    }

    pub fn current_question(&self) -> Option<&AnsweredQuestion> {
        self.active_index().and_then(|i| self.questions.get(i))
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    /// Update the transient answer for the current question. An edit clears
    /// a rejection or transport error back to the presenting state. Returns
    /// false when the session accepts no edits (finished, empty, or a
    /// validation in flight).
    pub fn edit_answer(&mut self, text: impl Into<String>) -> bool {
        let index = match self.state {
            SessionState::Presenting(i)
            | SessionState::Blocked { index: i, .. }
            | SessionState::Error { index: i, .. } => i,
            SessionState::Validating(_) | SessionState::Finished | SessionState::Empty => {
                return false
            }
        };
        self.questions[index].answer = text.into();
        self.state = SessionState::Presenting(index);
        true
    }

    /// Attempt to advance past the current question.
    ///
    /// A blank answer is rejected without a transition. A non-last question
    /// goes through one qualification call; the last question finishes the
    /// session directly, so a set of N questions takes exactly N-1
    /// qualifications. A transport failure may be retried as-is, but a
    /// rejected answer must be edited before it can be resubmitted. At most
    /// one validation is in flight at a time; the exclusive borrow enforces
    /// that no second advance can start.
    pub async fn advance(&mut self) -> SessionState {
        let index = match self.state {
            SessionState::Presenting(i) | SessionState::Blocked { index: i, .. } => i,
            SessionState::Error { .. }
            | SessionState::Validating(_)
            | SessionState::Finished
            | SessionState::Empty => return self.state.clone(),
        };

        if self.questions[index].answer.trim().is_empty() {
            return self.state.clone();
        }

        if index + 1 == self.questions.len() {
            self.finish();
            return self.state.clone();
        }

        self.state = SessionState::Validating(index);
        let request = build_qualification_request(
            &self.qualification_rules,
            &self.questions[index].question,
            &self.questions[index].answer,
        );

        self.state = match self.gateway.complete(request).await {
            Err(e) => {
                tracing::warn!(
                    project_id = %self.project_id,
                    question_index = index,
                    error = %e,
                    "qualification call failed"
                );
                SessionState::Blocked {
                    index,
                    message: e.to_string(),
                }
            }
            Ok(response) => match response.json {
                Some(json) if json.get("success").and_then(|v| v.as_bool()) == Some(true) => {
                    SessionState::Presenting(index + 1)
                }
                Some(json) => SessionState::Error {
                    index,
                    message: json
                        .get("message")
                        .and_then(|v| v.as_str())
                        .filter(|s| !s.is_empty())
                        .unwrap_or(DEFAULT_REJECTION_MESSAGE)
                        .to_string(),
                },
                None => SessionState::Error {
                    index,
                    message: DEFAULT_REJECTION_MESSAGE.to_string(),
                },
            },
        };

        self.state.clone()
    }

    /// Transition to the finished state and hand the submission snapshot to
    /// the persistence collaborator. The transition never waits on the
    /// write; its outcome is logged and emitted as a pipeline event.
    fn finish(&mut self) {
        self.state = SessionState::Finished;
        if self.submitted {
            return;
        }
        self.submitted = true;

        let submission = Submission {
            id: new_id(),
            project_id: self.project_id.clone(),
            contact_id: self.contact.id.clone(),
            questions: self.questions.clone(),
        };
        let store = self.store.clone();
        let events = self.events.clone();
        let project_id = self.project_id.clone();

        tokio::spawn(async move {
            match store.create_submission(submission).await {
                Ok(submission_id) => {
                    tracing::info!(project_id, submission_id, "submission persisted");
                    emit(
                        &events,
                        PipelineEvent::SubmissionPersisted {
                            project_id,
                            submission_id,
                        },
                    );
                }
                Err(e) => {
                    tracing::error!(project_id, error = %e, "failed to persist submission");
                    emit(
                        &events,
                        PipelineEvent::SubmissionPersistFailed {
                            project_id,
                            message: e.to_string(),
                        },
                    );
                }
            }
        });
    }
}

fn build_qualification_request(rules: &str, question: &str, answer: &str) -> ChatRequest {
    let system = format!(
        r#"You are a helpful assistant making sure questions are qualified based on rules.
below:
{}

always return parsable json {{success: boolean, message: string}} with success true if the answer is qualified and false if not, and message with reason if not qualified."#,
        rules
    );
    let user = format!(
        "Question:{}, Answer:{}",
        serde_json::Value::String(question.to_string()),
        serde_json::Value::String(answer.to_string()),
    );
    ChatRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualification_request_embeds_rules_and_answer() {
        let request = build_qualification_request(
            "Answers must be at least 5 characters.",
            "What color is the sky?",
            "blue",
        );
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[0]
            .content
            .contains("Answers must be at least 5 characters."));
        assert!(request.messages[1].content.contains("\"blue\""));
        assert!(request.messages[1]
            .content
            .contains("\"What color is the sky?\""));
    }
}
