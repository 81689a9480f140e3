//! Training feedback
//!
//! Replays each known question against the live knowledge base and turns
//! every candidate whose answer matches exactly into a feedback record.

use tracing::{debug, info};

use super::monitor::CancelSignal;
use super::query;
use super::record::AnswerRecord;
use crate::error::{QnaError, Result};
use crate::remote::{FeedbackRecord, KnowledgeBaseIdentity, QnaBackend, Slice};

/// User id attached to every feedback record
pub const FEEDBACK_USER_ID: &str = "QnAService";

/// Number of candidates inspected per question
pub const TRAINING_TOP: usize = 8;

/// What a training run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainReport {
    pub questions_asked: usize,
    pub feedback_sent: usize,
}

/// Send feedback for every question whose expected answer is returned
///
/// No training call is made when nothing matched. Once `cancel` fires no
/// further question is asked and nothing is sent.
pub async fn train<B: QnaBackend + ?Sized>(
    backend: &B,
    kb: &KnowledgeBaseIdentity,
    records: &[AnswerRecord],
    slice: Slice,
    cancel: &CancelSignal,
) -> Result<TrainReport> {
    let mut report = TrainReport::default();
    let mut feedback = Vec::new();

    for record in records {
        for question in &record.questions {
            if cancel.is_cancelled() {
                return Err(QnaError::Interrupted);
            }
            let candidates = query::ask(backend, kb, question, slice, TRAINING_TOP).await?;
            report.questions_asked += 1;

            for candidate in candidates.iter().filter(|c| c.answer == record.answer) {
                feedback.push(FeedbackRecord {
                    user_id: FEEDBACK_USER_ID.to_string(),
                    user_question: question.clone(),
                    qna_id: candidate.id,
                });
            }
        }
    }

    if feedback.is_empty() {
        debug!(questions = report.questions_asked, "no exact matches, nothing to train");
        return Ok(report);
    }

    backend.submit_training_feedback(kb, &feedback).await?;
    report.feedback_sent = feedback.len();
    info!(
        questions = report.questions_asked,
        feedback = report.feedback_sent,
        "training feedback submitted"
    );
    Ok(report)
}
