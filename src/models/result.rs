// src/models/result.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents the 'test_results' table in the database.
/// One row per scored submission; rows are never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: i64,
    pub user_id: i64,
    pub test_id: i64,
    /// Percentage in [0, 100] with two fractional digits.
    pub score: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A result about to be appended; the id is assigned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTestResult {
    pub user_id: i64,
    pub test_id: i64,
    pub score: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected_option_id: i64,
}

/// DTO for submitting a quiz attempt.
/// The student is identified by the verified token, not by the body.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTestRequest {
    pub test_id: i64,
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

/// Response body of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub score: Decimal,
    pub total_questions: usize,
    pub correct_count: usize,
    pub result_id: i64,
}
