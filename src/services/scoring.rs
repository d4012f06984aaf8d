// src/services/scoring.rs

use std::collections::HashSet;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::{
    config::SCORE_DECIMAL_PLACES,
    models::{result::SubmittedAnswer, test::Test},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("test {0} has no questions")]
    NoQuestions(i64),
}

/// Outcome of scoring one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCard {
    pub correct_count: usize,
    /// Always the test's full question count.
    pub total_questions: usize,
    pub percentage: Decimal,
}

/// Scores `answers` against the structure of `test`.
///
/// * Answers to questions outside the test are ignored.
/// * Questions without a correct option cannot be matched.
/// * Only the first answer to a given question counts.
///
/// Fails with `ScoringError::NoQuestions` when the test is empty.
pub fn score(test: &Test, answers: &[SubmittedAnswer]) -> Result<ScoreCard, ScoringError> {
    let total_questions = test.questions.len();
    if total_questions == 0 {
        return Err(ScoringError::NoQuestions(test.id));
    }

    let mut answered = HashSet::new();
    let mut correct_count = 0;

    for answer in answers {
        if !answered.insert(answer.question_id) {
            continue;
        }
        let Some(question) = test.question(answer.question_id) else {
            continue;
        };
        let Some(correct) = question.correct_option() else {
            continue;
        };
        if correct.id == answer.selected_option_id {
            correct_count += 1;
        }
    }

    Ok(ScoreCard {
        correct_count,
        total_questions,
        percentage: percentage(correct_count, total_questions),
    })
}

/// `correct / total * 100`, rounded half away from zero to two places.
fn percentage(correct: usize, total: usize) -> Decimal {
    let raw = Decimal::from(correct) * Decimal::ONE_HUNDRED / Decimal::from(total);
    let mut value =
        raw.round_dp_with_strategy(SCORE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(SCORE_DECIMAL_PLACES);
    value
}
