// src/services/submission.rs

use thiserror::Error;

use super::{
    recorder,
    scoring::{self, ScoringError},
};
use crate::{
    models::result::{SubmissionOutcome, SubmitTestRequest},
    store::{ResultStore, StoreError, TestStructureProvider},
};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("test {0} not found")]
    TestNotFound(i64),

    #[error(transparent)]
    Domain(#[from] ScoringError),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Resolves the test, scores the answers and appends the result.
///
/// The score is only returned once the result row has been stored.
pub async fn submit_answers<S>(
    store: &S,
    student_id: i64,
    request: &SubmitTestRequest,
) -> Result<SubmissionOutcome, SubmissionError>
where
    S: TestStructureProvider + ResultStore + ?Sized,
{
    let test = store
        .get_test_structure(request.test_id)
        .await?
        .ok_or(SubmissionError::TestNotFound(request.test_id))?;

    let card = scoring::score(&test, &request.answers)?;

    tracing::debug!(
        student_id,
        test_id = test.id,
        correct = card.correct_count,
        total = card.total_questions,
        "Submission scored"
    );

    let result = recorder::record(store, student_id, test.id, card.percentage).await?;

    Ok(SubmissionOutcome {
        score: result.score,
        total_questions: card.total_questions,
        correct_count: card.correct_count,
        result_id: result.id,
    })
}
