use tokio::sync::mpsc;

/// Outcomes of background tasks the pipeline fires without awaiting.
///
/// The caller-visible transition (ingestion returning, a session reaching
/// its finished state) is never gated on these tasks, but their failures
/// must stay observable instead of vanishing in a detached task.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    QuestionSynthesisCompleted {
        project_id: String,
        question_count: usize,
    },
    QuestionSynthesisFailed {
        project_id: String,
        message: String,
    },
    SubmissionPersisted {
        project_id: String,
        submission_id: String,
    },
    SubmissionPersistFailed {
        project_id: String,
        message: String,
    },
}

pub type EventSender = mpsc::UnboundedSender<PipelineEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<PipelineEvent>;

/// Create an event channel for background-task outcomes.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Send an event if a sender is wired up; receivers going away is fine.
pub(crate) fn emit(events: &Option<EventSender>, event: PipelineEvent) {
    if let Some(sender) = events {
        let _ = sender.send(event);
    }
}
