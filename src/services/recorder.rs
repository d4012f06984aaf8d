// src/services/recorder.rs

use rust_decimal::Decimal;

use crate::{
    models::result::{NewTestResult, TestResult},
    store::{ResultStore, StoreError},
};

/// Appends one result row for a scored submission.
///
/// Storage failures (unknown student or test, connection loss) are returned
/// as-is; nothing is retried.
pub async fn record<S>(
    store: &S,
    student_id: i64,
    test_id: i64,
    score: Decimal,
) -> Result<TestResult, StoreError>
where
    S: ResultStore + ?Sized,
{
    let result = store
        .append_result(NewTestResult {
            user_id: student_id,
            test_id,
            score,
        })
        .await
        .map_err(|e| {
            tracing::error!(student_id, test_id, "Failed to append test result: {}", e);
            e
        })?;

    tracing::info!(
        result_id = result.id,
        student_id,
        test_id,
        score = %result.score,
        "Test result recorded"
    );

    Ok(result)
}
